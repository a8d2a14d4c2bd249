//! Liveness endpoint, mounted at the root rather than under `/api/v1` so
//! load balancers can probe it without a version prefix.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` when the database answers, `"degraded"` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Active blob backend (`"memory"` or `"s3"`).
    pub blob_backend: &'static str,
}

/// GET /health
///
/// The process can serve this even when Postgres is down; signing URLs and
/// everything else will fail, so the status flips to `degraded` instead of
/// failing the probe outright.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = coursebase_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        blob_backend: state.config.blob.backend.label(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
