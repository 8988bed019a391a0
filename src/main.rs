//! Entry point: load config, wire dependencies, and run the server.

use pusher_chat::config::Config;
use pusher_chat::services::{AllowAll, AuthService, PusherBroadcaster};
use pusher_chat::{create_app, AppState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let auth_service = AuthService::new(config.credentials.clone());
    let mut state = AppState::new(Arc::new(auth_service), Arc::new(AllowAll));

    match &config.pusher {
        Some(endpoint) => {
            let broadcaster = PusherBroadcaster::new(config.credentials.clone(), endpoint)
                .map_err(|e| anyhow::anyhow!("broadcaster: {}", e))?;
            tracing::info!(host = %endpoint.host, app_id = %endpoint.app_id, "chat forwarding enabled");
            state = state.with_broadcaster(Arc::new(broadcaster));
        }
        None => tracing::warn!("PUSHER_APP_ID not set, chat forwarding disabled"),
    }

    let app = create_app(state).layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
