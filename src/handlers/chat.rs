//! Chat message submission: validate and forward to the broker.

use axum::{extract::State, Form, Json};
use serde_json::json;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::{BroadcastEvent, ChatMessageForm, CHAT_CHANNEL, NEW_MESSAGE_EVENT};

/// POST /chat_messages — publish `{name, message}` on the chat channel.
/// The sender's `socket_id`, when given, is excluded from delivery.
pub async fn create_chat_message(
    State(state): State<AppState>,
    Form(body): Form<ChatMessageForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let broadcaster = state
        .broadcaster
        .as_ref()
        .ok_or_else(|| AppError::Config("broadcaster not configured".to_string()))?;

    let data = serde_json::to_value(body.chat_message())?;
    let event = BroadcastEvent::new(CHAT_CHANNEL, NEW_MESSAGE_EVENT, data)
        .excluding(body.exclude_socket_id());
    broadcaster.trigger(&event).await?;

    Ok(Json(json!({
        "ok": true,
        "channel": CHAT_CHANNEL,
        "event": NEW_MESSAGE_EVENT
    })))
}
