//! Test utilities for palaver-core
//!
//! Helpers shared by unit tests, integration tests and the CLI tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::app::protocol::OutboundMessage;
use crate::app::{AppConfig, ChatController, ControllerHandle, ReplyConfig};
use crate::error::{Error, Result};
use crate::model_registry::ModelRegistry;
use crate::session::{InMemorySessionStore, SessionStore};

/// Built-in registry with replies that skip the simulated delay.
pub fn test_app_config() -> Result<AppConfig> {
    let registry = Arc::new(ModelRegistry::builtin()?);
    Ok(AppConfig::new(registry).with_reply(ReplyConfig::instant()))
}

/// Spawn a controller over a fresh in-memory store.
pub fn spawn_in_memory(config: &AppConfig) -> (ControllerHandle, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new(config.model_registry.default_id()));
    let handle = ChatController::spawn(config, store.clone() as Arc<dyn SessionStore>);
    (handle, store)
}

/// Drain every update already queued on `rx` without waiting.
pub fn drain_updates(rx: &mut broadcast::Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

/// Wait for the next update, failing after `timeout`.
pub async fn next_update(
    rx: &mut broadcast::Receiver<OutboundMessage>,
    timeout: Duration,
) -> Result<OutboundMessage> {
    match tokio::time::timeout(timeout, rx.recv()).await {
        Ok(Ok(update)) => Ok(update),
        Ok(Err(_)) | Err(_) => Err(Error::ChannelClosed),
    }
}
