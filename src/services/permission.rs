//! Pluggable permission checks for channel authorization.

use axum::http::HeaderMap;

use crate::models::ChannelAuthRequest;

/// Decides whether the caller may subscribe to the requested channel.
///
/// Any `Fn(&HeaderMap, &ChannelAuthRequest) -> bool` closure is a permission check, so
/// session- or cookie-based policies can be injected without touching the signer.
pub trait PermissionCheck: Send + Sync {
    fn permits(&self, headers: &HeaderMap, request: &ChannelAuthRequest) -> bool;
}

/// Placeholder policy: every subscription is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionCheck for AllowAll {
    fn permits(&self, _headers: &HeaderMap, _request: &ChannelAuthRequest) -> bool {
        true
    }
}

impl<F> PermissionCheck for F
where
    F: Fn(&HeaderMap, &ChannelAuthRequest) -> bool + Send + Sync,
{
    fn permits(&self, headers: &HeaderMap, request: &ChannelAuthRequest) -> bool {
        self(headers, request)
    }
}
