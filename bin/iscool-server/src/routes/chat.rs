//! Chat route: role-tagged messages in, one provider call, flat reply out.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::chat::{ChatRequest, ChatResponse, Message};
use crate::state::AppState;
use crate::transform::to_conversation;

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(ChatRequest, ChatResponse, Message))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Generate a reply for a conversation (`POST /chat`).
///
/// `system` messages become the provider's system instruction; `user` and
/// `assistant` messages become `user` / `model` turns in their original order.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply generated", body = ChatResponse),
        (status = 422, description = "Body does not match the request shape"),
        (status = 500, description = "Provider or internal error"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(req) = payload?;

    let model = req
        .model
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(state.config.default_model.as_str());

    let conversation = to_conversation(&req.messages);
    debug!(
        model,
        turns = conversation.turns.len(),
        has_system_instruction = conversation.system_instruction.is_some(),
        "chat request"
    );

    let reply = state
        .provider
        .generate(
            model,
            conversation.system_instruction.as_deref(),
            &conversation.turns,
        )
        .await?;

    info!(model, reply_len = reply.len(), "chat reply generated");
    Ok(Json(ChatResponse { reply }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
