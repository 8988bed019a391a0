//! Channel authorization request and token models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Form body of `POST /pusher/auth`, as sent by the broker's browser client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelAuthRequest {
    #[serde(default)]
    pub socket_id: String,
    #[serde(default)]
    pub channel_name: String,
}

impl ChannelAuthRequest {
    pub fn new(socket_id: impl Into<String>, channel_name: impl Into<String>) -> Self {
        Self {
            socket_id: socket_id.into(),
            channel_name: channel_name.into(),
        }
    }

    /// The exact bytes the broker expects to be signed: `socket_id:channel_name`.
    pub fn string_to_sign(&self) -> String {
        format!("{}:{}", self.socket_id, self.channel_name)
    }
}

/// Signed subscription token, valid only for the (socket_id, channel_name) it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub app_key: String,
    pub signature: String,
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.app_key, self.signature)
    }
}

/// JSON body returned to the client: `{"auth": "<app_key>:<signature>"}`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub auth: String,
}

impl From<AuthToken> for AuthResponse {
    fn from(token: AuthToken) -> Self {
        Self {
            auth: token.to_string(),
        }
    }
}
