//! Request body and query decoding, and the bridge to blocking service calls.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use serde::de::DeserializeOwned;

use crate::service::{ServiceError, ServiceResult};
use crate::web::error::{ApiError, ApiResult};

/// Decode a JSON object body into an input struct.
///
/// An empty body decodes to the all-`None` input so validation can report
/// the missing fields. Anything that is not a JSON object, or has a wrongly
/// typed field, is `InvalidData`.
///
/// # Errors
///
/// Returns `InvalidData` naming the resource when the body cannot be decoded.
pub fn parse_body<T>(body: &Bytes, resource: &str) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| invalid(resource, &e))?;
    if !value.is_object() {
        return Err(ServiceError::invalid(
            format!("{resource} data"),
            "Expected a JSON object.",
        )
        .into());
    }
    serde_json::from_value(value).map_err(|e| invalid(resource, &e))
}

fn invalid(resource: &str, err: &serde_json::Error) -> ApiError {
    tracing::warn!("Rejected {resource} body: {err}");
    ServiceError::invalid(format!("{resource} data"), err.to_string()).into()
}

/// Unwrap a decoded query string, folding a rejection into `InvalidData` on `field`
///
/// # Errors
///
/// Returns `InvalidData` carrying the decoder's message.
pub fn parse_query<T>(query: Result<Query<T>, QueryRejection>, field: &str) -> ApiResult<T> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            let reason = rejection.body_text();
            tracing::warn!("Rejected query string: {reason}");
            Err(ServiceError::invalid(field, reason).into())
        }
    }
}

/// Run a blocking service call off the async executor
///
/// # Errors
///
/// Propagates the service error, or `Internal` if the task panicked.
pub async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::gene::GeneInput;
    use crate::schema::variant::VariantInput;

    fn service_error(err: ApiError) -> ServiceError {
        match err {
            ApiError::Service(e) => e,
            ApiError::Internal(cause) => panic!("unexpected internal error {cause}"),
        }
    }

    #[test]
    fn test_empty_body_is_default_input() {
        let input: GeneInput = parse_body(&Bytes::from_static(b"  \n"), "gene").unwrap();
        assert!(input.symbol.is_none());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let body = Bytes::from_static(br#"{"symbol": "TP53", "id": 99, "extra": true}"#);
        let input: GeneInput = parse_body(&body, "gene").unwrap();
        assert_eq!(input.symbol, Some(Some("TP53".to_string())));
    }

    #[test]
    fn test_malformed_bodies_are_invalid_data() {
        for raw in [&b"{not json"[..], b"[1, 2]", b"\"text\"", br#"{"chromosome": 17}"#] {
            let err = parse_body::<VariantInput>(&Bytes::copy_from_slice(raw), "variant")
                .unwrap_err();
            assert!(
                matches!(service_error(err), ServiceError::InvalidData { ref field, .. } if field == "variant data"),
                "body {}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct Filter {
        patient_id: Option<String>,
    }

    #[test]
    fn test_query_rejection_is_invalid_data() {
        let uri: axum::http::Uri = "/reports?patient_id=a&patient_id=b".parse().unwrap();
        let err = parse_query(Query::<Filter>::try_from_uri(&uri), "patient_id").unwrap_err();
        assert!(matches!(
            service_error(err),
            ServiceError::InvalidData { ref field, ref reason }
                if field == "patient_id" && reason.contains("duplicate field")
        ));

        let uri: axum::http::Uri = "/reports?patient_id=a".parse().unwrap();
        let filter = parse_query(Query::<Filter>::try_from_uri(&uri), "patient_id").unwrap();
        assert_eq!(filter.patient_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_blocking_maps_panics_to_internal() {
        let result: ApiResult<()> = blocking(|| panic!("boom")).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));

        let ok = blocking(|| Ok(7)).await.unwrap();
        assert_eq!(ok, 7);
    }
}
