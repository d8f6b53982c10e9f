use std::sync::Arc;

use axum::{extract::State, response::Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::web::server::AppState;

pub const SERVICE_NAME: &str = "geno-catalog";

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub service: String,
    pub version: String,
    pub status: String,
    pub timestamp: String,
    /// "ok" when the database answers, "unavailable" otherwise
    pub database: String,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Liveness check
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "UP".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: timestamp(),
    })
}

/// Readiness check; pings the database
pub async fn status(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let db = state.catalog.db.clone();
    let reachable = tokio::task::spawn_blocking(move || db.ping())
        .await
        .map(|ping| ping.is_ok())
        .unwrap_or(false);
    if !reachable {
        tracing::warn!("Health check: database unavailable");
    }

    Json(HealthStatus {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        timestamp: timestamp(),
        database: if reachable { "ok" } else { "unavailable" }.to_string(),
    })
}
