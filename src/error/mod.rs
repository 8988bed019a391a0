//! Application error types for robust error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors.
///
/// Messages are built from static text or caller-visible input only; key material and
/// computed signatures never end up in a variant.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error("Upstream request error: {0}")]
    Upstream(reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The request URL carries signed query parameters, so it is dropped from the error.
impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.without_url())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Forbidden => return (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server misconfigured".to_string(),
            ),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Broadcast(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "broadcast service unreachable".to_string(),
            ),
            AppError::Serialization(e) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid payload: {}", e),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
