//! Health / liveness endpoint.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Liveness endpoint.
///
/// Always returns `{"status": "ok"}` with HTTP 200; it does not touch the
/// provider.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is alive", body = Value)
    )
)]
pub async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
