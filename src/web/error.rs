//! Translation of service failures into HTTP responses.
//!
//! | Failure                 | Status | `error` tag             |
//! |-------------------------|--------|-------------------------|
//! | `GeneNotFound`          | 404    | Gene Not Found          |
//! | `VariantNotFound`       | 404    | Variant Not Found       |
//! | `PathwayNotFound`       | 404    | Pathway Not Found       |
//! | `AssociationNotFound`   | 404    | Association Not Found   |
//! | `DuplicateGene`         | 409    | Duplicate Gene          |
//! | `InvalidData`           | 400    | Invalid Data            |
//! | anything else           | 500    | Internal Server Error   |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::service::ServiceError;

const INTERNAL_ERROR_TAG: &str = "Internal Server Error";
const INTERNAL_ERROR_DETAIL: &str = "An unexpected error occurred. Please try again later.";

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
    pub status_code: u16,
}

/// Build an error body, logging any internal cause server side only
pub fn create_safe_error_response(
    status: StatusCode,
    tag: &str,
    detail: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({tag}): {internal_msg}");
    }

    ErrorResponse {
        error: tag.to_string(),
        detail: detail.to_string(),
        status_code: status.as_u16(),
    }
}

/// Error returned by every handler
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// A blocking task panicked or was cancelled
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl ApiError {
    /// Status code and tag for this failure
    #[must_use]
    pub fn status_and_tag(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Service(ServiceError::GeneNotFound(_)) => (StatusCode::NOT_FOUND, "Gene Not Found"),
            Self::Service(ServiceError::VariantNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Variant Not Found")
            }
            Self::Service(ServiceError::PathwayNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Pathway Not Found")
            }
            Self::Service(ServiceError::AssociationNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Association Not Found")
            }
            Self::Service(ServiceError::DuplicateGene { .. }) => {
                (StatusCode::CONFLICT, "Duplicate Gene")
            }
            Self::Service(ServiceError::InvalidData { .. }) => {
                (StatusCode::BAD_REQUEST, "Invalid Data")
            }
            Self::Service(ServiceError::Storage(_)) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_TAG)
            }
        }
    }

    fn to_body(&self) -> ErrorResponse {
        let (status, tag) = self.status_and_tag();
        match self {
            Self::Service(e) if e.is_client_error() => {
                create_safe_error_response(status, tag, &e.to_string(), None)
            }
            Self::Service(e) => create_safe_error_response(
                status,
                tag,
                INTERNAL_ERROR_DETAIL,
                Some(&e.to_string()),
            ),
            Self::Internal(cause) => {
                create_safe_error_response(status, tag, INTERNAL_ERROR_DETAIL, Some(cause))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.to_body();
        let status = StatusCode::from_u16(body.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
