//! Data models for credentials, channel auth, and chat events.

pub mod auth;
pub mod channel;
pub mod chat;
pub mod credentials;

pub use auth::*;
pub use channel::*;
pub use chat::*;
pub use credentials::Credentials;
