use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

use super::protocol::{InboundMessage, OutboundMessage};

/// Abstraction over a channel that accepts [`InboundMessage`]s sent from a
/// chat surface.
#[async_trait]
pub trait InboundSink: Send + Sync {
    /// Queue an event for the controller without waiting for it to be handled.
    async fn send_inbound(&self, message: InboundMessage) -> Result<()>;
}

/// Source of [`OutboundMessage`]s that surfaces listen to for re-rendering.
pub trait OutboundSource: Send + Sync {
    /// Obtain a fresh receiver. Only updates emitted after the call are seen,
    /// so subscribe before sending `requestState`.
    fn subscribe(&self) -> broadcast::Receiver<OutboundMessage>;
}
