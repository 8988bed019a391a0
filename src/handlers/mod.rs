//! HTTP request handlers.

pub mod chat;
pub mod http;

pub use chat::*;
pub use http::*;
