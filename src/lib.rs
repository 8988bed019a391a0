//! Chat demo backend for a hosted Pusher-compatible broker.
//!
//! Signs private-channel subscriptions (`POST /pusher/auth`) and forwards chat
//! messages to the broker's REST API (`POST /chat_messages`).

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{AuthService, PusherBroadcaster};

use axum::routing::{get, post};
use handlers::http;

/// Build the API router (auth, chat, health). Used by main and by integration tests.
/// The chat route is only mounted when a broadcaster is configured.
pub fn create_app(state: AppState) -> axum::Router {
    let mut router = axum::Router::new()
        .route("/pusher/auth", post(http::pusher_auth))
        .route("/health", get(http::health));

    if state.broadcaster.is_some() {
        router = router.route("/chat_messages", post(handlers::create_chat_message));
    }

    router.with_state(state)
}
