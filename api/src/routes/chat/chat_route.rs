//! POST /api/chat: answers the latest message with RAG context.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument, warn};

use crate::{
    core::app_state::AppState, error_handler::AppError, routes::chat::chat_request::ChatRequest,
};

/// Handler: POST /api/chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/chat \
///   -H 'content-type: application/json' \
///   -d '{"messages":[{"role":"user","content":"What projects has Prince built?"}]}'
/// ```
#[instrument(name = "chat_route", skip_all)]
pub async fn chat_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "chat_route: invalid body");
            return AppError::from(rejection).into_response();
        }
    };

    let Some(backend) = state.backend().await else {
        return AppError::Unconfigured.into_response();
    };

    let messages = body.into_messages();
    debug!(messages = messages.len(), "chat_route: start");

    let reply = backend.pipeline.answer(&messages).await;
    let status = if reply.outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(reply.message)).into_response()
}
