//! Messages exchanged between a chat surface and the controller.
//!
//! Both directions are tagged by a `type` field so they can cross any
//! serialized channel (webview bridge, socket, stdio) unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Message;

/// Events sent by a surface to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    RequestState,
    Send { text: String },
    SetModel { id: String },
    Clear,
}

impl InboundMessage {
    /// Parse a raw event. Malformed events yield `None` and are dropped.
    pub fn parse(value: &Value) -> Option<Self> {
        match Self::deserialize(value) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!(
                    target: "core.protocol",
                    error = %e,
                    "Dropping malformed inbound event"
                );
                None
            }
        }
    }

    pub fn parse_str(raw: &str) -> Option<Self> {
        serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(|value| Self::parse(&value))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::RequestState => "requestState",
            InboundMessage::Send { .. } => "send",
            InboundMessage::SetModel { .. } => "setModel",
            InboundMessage::Clear => "clear",
        }
    }
}

/// Updates pushed by the controller to every attached surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    State { messages: Vec<Message> },
    Append { message: Message },
    Model { id: String, label: String },
    Cleared,
}
