use crate::app::protocol::OutboundMessage;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Push an update to every attached surface.
    Emit(OutboundMessage),

    /// Write the full session snapshot to the store.
    Persist { session: Session },

    /// Produce the stubbed reply for `prompt` using `model_id`.
    GenerateReply { model_id: String, prompt: String },
}
