//! Application configuration loaded from environment.

use std::net::SocketAddr;

use crate::models::Credentials;

const DEFAULT_HOST: &str = "api.pusherapp.com";

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// `PUSHER_KEY` / `PUSHER_SECRET`. Both required.
    pub credentials: Credentials,
    /// Broker REST endpoint; `None` when `PUSHER_APP_ID` is unset, which disables chat forwarding.
    pub pusher: Option<PusherEndpoint>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

/// Where the broker's REST API lives for this app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PusherEndpoint {
    pub app_id: String,
    pub scheme: String,
    pub host: String,
}

impl PusherEndpoint {
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source. Blank values count as unset.
    /// Key and secret are taken byte for byte; other values are trimmed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let raw = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server_addr = var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let app_key = raw("PUSHER_KEY").ok_or(ConfigLoadError::Missing("PUSHER_KEY"))?;
        let app_secret = raw("PUSHER_SECRET").ok_or(ConfigLoadError::Missing("PUSHER_SECRET"))?;
        let credentials = Credentials::new(app_key, app_secret)
            .map_err(|e| ConfigLoadError::InvalidCredentials(e.to_string()))?;

        let pusher = var("PUSHER_APP_ID").map(|app_id| {
            let host = var("PUSHER_HOST").unwrap_or_else(|| match var("PUSHER_CLUSTER") {
                Some(cluster) => format!("api-{}.pusher.com", cluster),
                None => DEFAULT_HOST.to_string(),
            });
            PusherEndpoint {
                app_id,
                scheme: var("PUSHER_SCHEME").unwrap_or_else(|| "https".to_string()),
                host,
            }
        });

        let log_level = var("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            credentials,
            pusher,
            log_level,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}
