//! Authorization for private channels (Pusher-compatible HMAC).

use axum::http::HeaderMap;
use hmac::Mac;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AuthToken, ChannelAuthRequest, ChannelKind, Credentials};
use crate::services::permission::PermissionCheck;

/// Produces subscription tokens for (socket_id, channel_name) pairs.
pub trait ChannelSigner: Send + Sync {
    fn sign(&self, request: &ChannelAuthRequest) -> AppResult<AuthToken>;
}

/// Signs channel subscriptions.
/// Pusher-style: `app_key:hex(HMAC-SHA256(app_secret, socket_id:channel_name))`.
#[derive(Debug, Clone)]
pub struct AuthService {
    credentials: Credentials,
}

impl AuthService {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sign a subscription for `channel` on connection `socket_id`.
    pub fn sign_channel(&self, socket_id: &str, channel: &str) -> AppResult<AuthToken> {
        self.sign(&ChannelAuthRequest::new(socket_id, channel))
    }

    /// Check a `key:signature` token against the request it claims to authorize.
    /// The signature comparison is constant time.
    pub fn verify_channel_auth(&self, request: &ChannelAuthRequest, auth: &str) -> AppResult<()> {
        validate_request(request)?;

        let (key, signature) = auth
            .split_once(':')
            .ok_or_else(|| AppError::Auth("malformed auth token".to_string()))?;
        if key != self.credentials.app_key() {
            return Err(AppError::Auth("unknown app key".to_string()));
        }
        let signature = hex::decode(signature)
            .map_err(|_| AppError::Auth("malformed auth token".to_string()))?;

        let mut mac = self.credentials.mac()?;
        mac.update(request.string_to_sign().as_bytes());
        mac.verify_slice(&signature).map_err(|_| {
            debug!(channel = %request.channel_name, "auth signature mismatch");
            AppError::Auth("invalid auth signature".to_string())
        })
    }
}

impl ChannelSigner for AuthService {
    fn sign(&self, request: &ChannelAuthRequest) -> AppResult<AuthToken> {
        validate_request(request)?;

        let kind = ChannelKind::classify(&request.channel_name);
        if kind == ChannelKind::Presence {
            warn!(channel = %request.channel_name, "signing presence channel without member data");
        }

        let signature = self
            .credentials
            .sign(request.string_to_sign().as_bytes())?;
        debug!(
            socket_id = %request.socket_id,
            channel = %request.channel_name,
            kind = ?kind,
            "channel auth issued"
        );

        Ok(AuthToken {
            app_key: self.credentials.app_key().to_string(),
            signature,
        })
    }
}

/// Both fields must be present and free of NUL bytes. A `:` in the socket id would let
/// two different pairs produce the same signed message, so it is refused too.
fn validate_request(request: &ChannelAuthRequest) -> AppResult<()> {
    if request.socket_id.is_empty() {
        return Err(AppError::InvalidInput("socket_id must not be empty".to_string()));
    }
    if request.channel_name.is_empty() {
        return Err(AppError::InvalidInput(
            "channel_name must not be empty".to_string(),
        ));
    }
    if request.socket_id.contains('\0') || request.channel_name.contains('\0') {
        return Err(AppError::InvalidInput(
            "socket_id and channel_name must not contain NUL bytes".to_string(),
        ));
    }
    if request.socket_id.contains(':') {
        return Err(AppError::InvalidInput(
            "socket_id must not contain ':'".to_string(),
        ));
    }
    Ok(())
}

/// Run the permission check, then sign. A denied request never reaches the signer.
pub fn authorize(
    permission: &dyn PermissionCheck,
    signer: &dyn ChannelSigner,
    headers: &HeaderMap,
    request: &ChannelAuthRequest,
) -> AppResult<AuthToken> {
    if !permission.permits(headers, request) {
        debug!(channel = %request.channel_name, "channel auth denied");
        return Err(AppError::Forbidden);
    }
    signer.sign(request)
}
