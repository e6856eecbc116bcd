//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional OpenAPI document at `/openapi.json` (disable with `ISCOOL_ENABLE_DOCS=false`)
//! - Health route
//! - Chat route

mod chat;
pub mod doc;
mod health;

use axum::routing::get;
use axum::{Json, Router, middleware};
use std::sync::Arc;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router());

    if state.config.enable_docs {
        let api_doc = doc::get_docs();
        app = app.route(
            "/openapi.json",
            get(move || {
                let api_doc = api_doc.clone();
                async move { Json(api_doc) }
            }),
        );
    }

    app
        // Layers added later wrap earlier ones: trace runs before CORS.
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

// ── Test support ───────────────────────────────────────────────────────────────
