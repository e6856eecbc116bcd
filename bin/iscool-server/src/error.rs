//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. Failures render as `{"detail": "..."}`
//! carrying the raw error text, provider errors included.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// All errors that can occur in the iscool-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body was rejected by the JSON extractor.
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    /// Propagated from the generation provider.
    #[error(transparent)]
    Provider(#[from] iscool_gemini::GeminiError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::InvalidBody(rejection) => {
                warn!(error = %rejection, "rejected request body");
                rejection.status()
            }
            ServerError::Provider(e) => {
                error!(error = %e, "provider call failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let detail = match &self {
            ServerError::InvalidBody(rejection) => rejection.body_text(),
            ServerError::Provider(e) => e.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
