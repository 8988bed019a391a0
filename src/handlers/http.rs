//! HTTP handlers: channel auth and health.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Form, Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::models::{AuthResponse, ChannelAuthRequest};
use crate::services::{authorize, Broadcaster, ChannelSigner, PermissionCheck};

/// Shared application state, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub signer: Arc<dyn ChannelSigner>,
    pub permission: Arc<dyn PermissionCheck>,
    /// `None` disables `POST /chat_messages`.
    pub broadcaster: Option<Arc<dyn Broadcaster>>,
}

impl AppState {
    pub fn new(signer: Arc<dyn ChannelSigner>, permission: Arc<dyn PermissionCheck>) -> Self {
        Self {
            signer,
            permission,
            broadcaster: None,
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }
}

/// POST /pusher/auth — sign a private channel subscription for the broker's client.
/// Form fields: `socket_id`, `channel_name`.
pub async fn pusher_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(body): Form<ChannelAuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = authorize(
        state.permission.as_ref(),
        state.signer.as_ref(),
        &headers,
        &body,
    )?;
    Ok(Json(token.into()))
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "pusher-chat" })),
    )
}
