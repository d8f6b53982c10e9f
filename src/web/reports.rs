use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::schema::report::{ReportInput, ReportOutput};
use crate::web::error::ApiResult;
use crate::web::extract::{blocking, parse_body, parse_query};
use crate::web::server::AppState;

const RESOURCE: &str = "report";

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub patient_id: Option<String>,
}

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ReportOutput>>> {
    let reports = state.catalog.reports.clone();
    blocking(move || reports.list()).await.map(Json)
}

/// `GET /patient-variant-reports/by_patient/?patient_id=<uuid>`
pub async fn by_patient(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PatientQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ReportOutput>>> {
    let query = parse_query(query, "patient_id")?;
    let reports = state.catalog.reports.clone();
    blocking(move || reports.list_by_patient(query.patient_id.as_deref()))
        .await
        .map(Json)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ReportOutput>)> {
    let input: ReportInput = parse_body(&body, RESOURCE)?;
    let reports = state.catalog.reports.clone();
    let report = blocking(move || reports.create(input)).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReportOutput>> {
    let reports = state.catalog.reports.clone();
    blocking(move || reports.retrieve(&id)).await.map(Json)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ReportOutput>> {
    let input: ReportInput = parse_body(&body, RESOURCE)?;
    let reports = state.catalog.reports.clone();
    blocking(move || reports.update(&id, input)).await.map(Json)
}

pub async fn partial_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ReportOutput>> {
    let input: ReportInput = parse_body(&body, RESOURCE)?;
    let reports = state.catalog.reports.clone();
    blocking(move || reports.partial_update(&id, input))
        .await
        .map(Json)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let reports = state.catalog.reports.clone();
    blocking(move || reports.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
