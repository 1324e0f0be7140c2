use crate::dtos::{
    ChatHistoryResponse, ChatResetResponse, SendMessageRequest, SendMessageResponse,
    MISSING_MESSAGE_ERROR, RESET_STATUS,
};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

fn missing_message() -> AppError {
    AppError::BadRequest(anyhow::anyhow!(MISSING_MESSAGE_ERROR))
}

pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let Json(req) = payload.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            let limit = state.config.http.max_body_bytes;
            tracing::warn!(limit, "Chat payload exceeds body limit");
            return AppError::PayloadTooLarge(format!(
                "Request body exceeds the {} byte limit",
                limit
            ));
        }
        tracing::debug!(error = %e, "Rejected chat payload");
        missing_message()
    })?;

    req.validate().map_err(|e| {
        tracing::debug!(error = %e, "Chat payload failed validation");
        missing_message()
    })?;

    tracing::info!(message_len = req.message.len(), "Handling chat message");

    let reply = state.chat.send(req.message).await?;

    Ok(Json(SendMessageResponse { reply }))
}

pub async fn get_history(State(state): State<AppState>) -> Json<ChatHistoryResponse> {
    Json(ChatHistoryResponse {
        history: state.chat.store().history().await,
    })
}

pub async fn reset_history(State(state): State<AppState>) -> Json<ChatResetResponse> {
    state.chat.reset().await;
    Json(ChatResetResponse {
        status: RESET_STATUS.to_string(),
    })
}
