use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::schema::variant::{VariantInput, VariantOutput};
use crate::web::error::ApiResult;
use crate::web::extract::{blocking, parse_body};
use crate::web::server::AppState;

const RESOURCE: &str = "variant";

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<VariantOutput>>> {
    let variants = state.catalog.variants.clone();
    blocking(move || variants.list()).await.map(Json)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<VariantOutput>)> {
    let input: VariantInput = parse_body(&body, RESOURCE)?;
    let variants = state.catalog.variants.clone();
    let variant = blocking(move || variants.create(input)).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<VariantOutput>> {
    let variants = state.catalog.variants.clone();
    blocking(move || variants.retrieve(&id)).await.map(Json)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<VariantOutput>> {
    let input: VariantInput = parse_body(&body, RESOURCE)?;
    let variants = state.catalog.variants.clone();
    blocking(move || variants.update(&id, input)).await.map(Json)
}

pub async fn partial_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<VariantOutput>> {
    let input: VariantInput = parse_body(&body, RESOURCE)?;
    let variants = state.catalog.variants.clone();
    blocking(move || variants.partial_update(&id, input))
        .await
        .map(Json)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let variants = state.catalog.variants.clone();
    blocking(move || variants.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
