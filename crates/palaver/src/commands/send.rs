use async_trait::async_trait;
use eyre::{Result, eyre};
use palaver_core::app::{ControllerHandle, InboundMessage, OutboundMessage};
use palaver_core::session::{Message, Role};
use std::io::Write;
use tokio::sync::broadcast;

use super::Command;
use crate::RuntimeOptions;

pub struct SendCommand {
    pub text: String,
    /// Route through the host path: an assistant message with no user turn.
    pub host: bool,
    pub options: RuntimeOptions,
}

#[async_trait]
impl Command for SendCommand {
    async fn execute(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(eyre!("Nothing to send: message is empty"));
        }

        let runtime = self.options.start().await?;
        let reply = if self.host {
            post_and_wait(&runtime.handle, &self.text).await?
        } else {
            send_and_wait(&runtime.handle, &self.text).await?
        };
        runtime.handle.shutdown();

        let mut stdout = std::io::stdout();
        writeln!(stdout, "{}", reply.text)?;
        Ok(())
    }
}

/// Dispatch a `send` and return the assistant message it produced.
pub async fn send_and_wait(handle: &ControllerHandle, text: &str) -> Result<Message> {
    let mut updates = handle.subscribe();
    handle
        .dispatch(InboundMessage::Send {
            text: text.to_string(),
        })
        .await?;

    last_assistant_append(&mut updates)
}

/// Post a host message and return the assistant message it produced.
pub async fn post_and_wait(handle: &ControllerHandle, text: &str) -> Result<Message> {
    let mut updates = handle.subscribe();
    handle.post_reply(text).await?;

    last_assistant_append(&mut updates)
}

fn last_assistant_append(updates: &mut broadcast::Receiver<OutboundMessage>) -> Result<Message> {
    let mut reply = None;
    while let Ok(update) = updates.try_recv() {
        if let OutboundMessage::Append { message } = update {
            if message.role == Role::Assistant {
                reply = Some(message);
            }
        }
    }

    reply.ok_or_else(|| eyre!("No reply was produced"))
}
