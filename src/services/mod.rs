//! Business logic: channel authorization, permission checks, and broadcasting.

pub mod auth;
pub mod broadcast;
pub mod permission;

pub use auth::{authorize, AuthService, ChannelSigner};
pub use broadcast::{Broadcaster, PusherBroadcaster};
pub use permission::{AllowAll, PermissionCheck};
