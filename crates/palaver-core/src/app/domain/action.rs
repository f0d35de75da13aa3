use crate::app::protocol::InboundMessage;
use crate::session::{MessageId, Session};

/// Inputs to the reducer. Ids and timestamps are minted by the caller so the
/// reducer stays deterministic.
#[derive(Debug, Clone)]
pub enum Action {
    /// Seed state from the store on first activation.
    Hydrate { session: Session },

    RequestState,

    UserInput {
        message_id: MessageId,
        text: String,
        timestamp: u64,
    },

    /// Reply text is final; it only needs appending.
    AssistantReply {
        message_id: MessageId,
        text: String,
        timestamp: u64,
    },

    SetModel { model_id: String },

    Clear,
}

impl Action {
    /// Map a surface event onto an action, minting ids for new messages.
    pub fn from_inbound(event: InboundMessage, timestamp: u64) -> Self {
        match event {
            InboundMessage::RequestState => Action::RequestState,
            InboundMessage::Send { text } => Action::UserInput {
                message_id: MessageId::new(),
                text,
                timestamp,
            },
            InboundMessage::SetModel { id } => Action::SetModel { model_id: id },
            InboundMessage::Clear => Action::Clear,
        }
    }
}
