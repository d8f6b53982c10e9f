use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::schema::gene::{GeneInput, GeneOutput};
use crate::web::error::ApiResult;
use crate::web::extract::{blocking, parse_body, parse_query};
use crate::web::server::AppState;

const RESOURCE: &str = "gene";

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub symbol: Option<String>,
}

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<GeneOutput>>> {
    let genes = state.catalog.genes.clone();
    blocking(move || genes.list()).await.map(Json)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<GeneOutput>)> {
    let input: GeneInput = parse_body(&body, RESOURCE)?;
    let genes = state.catalog.genes.clone();
    let gene = blocking(move || genes.create(input)).await?;
    Ok((StatusCode::CREATED, Json(gene)))
}

pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<GeneOutput>> {
    let genes = state.catalog.genes.clone();
    blocking(move || genes.retrieve(&id)).await.map(Json)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<GeneOutput>> {
    let input: GeneInput = parse_body(&body, RESOURCE)?;
    let genes = state.catalog.genes.clone();
    blocking(move || genes.update(&id, input)).await.map(Json)
}

pub async fn partial_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<GeneOutput>> {
    let input: GeneInput = parse_body(&body, RESOURCE)?;
    let genes = state.catalog.genes.clone();
    blocking(move || genes.partial_update(&id, input)).await.map(Json)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let genes = state.catalog.genes.clone();
    blocking(move || genes.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /genes/by_symbol/?symbol=TP53`
pub async fn by_symbol(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SymbolQuery>, QueryRejection>,
) -> ApiResult<Json<GeneOutput>> {
    let query = parse_query(query, "symbol")?;
    let genes = state.catalog.genes.clone();
    blocking(move || genes.find_by_symbol(query.symbol.as_deref()))
        .await
        .map(Json)
}
