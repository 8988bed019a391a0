//! Application credentials for the broadcasting service.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, AppResult};

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Immutable (app_key, app_secret) pair, built once at startup.
///
/// The secret cannot be read back out; it is only ever used to key an HMAC.
#[derive(Clone)]
pub struct Credentials {
    app_key: String,
    app_secret: Vec<u8>,
}

impl Credentials {
    /// Rejects an empty key or secret. The key is restricted to ASCII letters, digits, `-`,
    /// `_` and `.`, since it is both the token prefix and an unencoded REST query value.
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<Vec<u8>>) -> AppResult<Self> {
        let app_key = app_key.into();
        let app_secret = app_secret.into();

        if app_key.is_empty() {
            return Err(AppError::Config("app key must not be empty".to_string()));
        }
        if !app_key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        {
            return Err(AppError::Config(
                "app key may only contain ASCII letters, digits, '-', '_' and '.'".to_string(),
            ));
        }
        if app_secret.is_empty() {
            return Err(AppError::Config("app secret must not be empty".to_string()));
        }

        Ok(Self {
            app_key,
            app_secret,
        })
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Fresh HMAC-SHA256 instance keyed with the app secret.
    pub(crate) fn mac(&self) -> AppResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.app_secret)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("HMAC init failed")))
    }

    /// Lowercase hex HMAC-SHA256 of `message` under the app secret.
    pub fn sign(&self, message: &[u8]) -> AppResult<String> {
        let mut mac = self.mac()?;
        mac.update(message);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"[redacted]")
            .finish()
    }
}
