//! Conversation records persisted by the session store.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;
use uuid::Uuid;

use crate::utils::current_timestamp;

/// Role in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Opaque message identifier, unique per created message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new() -> Self {
        Self(format!("msg_{}", Uuid::now_v7()))
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single immutable chat entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Message {
    /// Create a message with a fresh id. Returns `None` when `text` is blank.
    /// The stored text is trimmed.
    pub fn new(role: Role, text: &str) -> Option<Self> {
        Self::with_timestamp(role, text, current_timestamp())
    }

    pub fn with_timestamp(role: Role, text: &str, timestamp: u64) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: MessageId::new(),
            role,
            text: text.to_string(),
            timestamp,
        })
    }
}

/// Persisted conversation for one user/workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub messages: Vec<Message>,
    pub model_id: String,
}

impl Session {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            model_id: model_id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(Message::new(Role::User, "").is_none());
        assert!(Message::new(Role::User, " \t\n ").is_none());
    }

    #[test]
    fn text_is_trimmed() {
        let msg = Message::new(Role::User, "  hello  ").unwrap();
        assert_eq!(msg.text, "hello");
        assert!(msg.id.as_str().starts_with("msg_"));
    }

    #[test]
    fn ids_are_unique() {
        let a = Message::new(Role::User, "a").unwrap();
        let b = Message::new(Role::User, "a").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::System.to_string(), "system");
    }
}
