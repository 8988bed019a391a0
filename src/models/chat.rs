//! Chat message form and broker event models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Channel the chat demo broadcasts on.
pub const CHAT_CHANNEL: &str = "private-chat";
/// Event name clients listen for.
pub const NEW_MESSAGE_EVENT: &str = "new_message";

/// Form body of `POST /chat_messages`, using Rails-style nested field names.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatMessageForm {
    #[serde(rename = "chat_message[name]", default)]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "chat_message[message]", default)]
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    /// Sender's connection; excluded from the broadcast so it does not echo back.
    #[serde(default)]
    pub socket_id: Option<String>,
}

impl ChatMessageForm {
    pub fn chat_message(&self) -> ChatMessage {
        ChatMessage {
            name: self.name.clone(),
            message: self.message.clone(),
        }
    }

    /// Sender socket id, ignoring blank values.
    pub fn exclude_socket_id(&self) -> Option<&str> {
        self.socket_id.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Payload delivered to subscribers of the chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub name: String,
    pub message: String,
}

/// An event to publish through the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastEvent {
    pub channels: Vec<String>,
    pub name: String,
    pub data: serde_json::Value,
    pub socket_id: Option<String>,
}

impl BroadcastEvent {
    pub fn new(channel: impl Into<String>, name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            channels: vec![channel.into()],
            name: name.into(),
            data,
            socket_id: None,
        }
    }

    pub fn excluding(mut self, socket_id: Option<&str>) -> Self {
        self.socket_id = socket_id.map(str::to_string);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_socket_id_is_not_excluded() {
        let form = ChatMessageForm {
            name: "ann".to_string(),
            message: "hi".to_string(),
            socket_id: Some("  ".to_string()),
        };
        assert_eq!(form.exclude_socket_id(), None);
    }

    #[test]
    fn validation_rejects_empty_message() {
        let form = ChatMessageForm {
            name: "ann".to_string(),
            message: String::new(),
            socket_id: None,
        };
        assert!(form.validate().is_err());
    }
}
