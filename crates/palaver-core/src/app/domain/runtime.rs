use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::app::AppConfig;
use crate::app::domain::action::Action;
use crate::app::domain::effect::Effect;
use crate::app::domain::reduce::reduce;
use crate::app::domain::reply::ReplyConfig;
use crate::app::domain::state::ChatState;
use crate::app::io::{InboundSink, OutboundSource};
use crate::app::protocol::{InboundMessage, OutboundMessage};
use crate::error::{Error, Result};
use crate::session::{MessageId, Session, SessionStore};
use crate::utils::current_timestamp;

const UPDATE_BROADCAST_CAPACITY: usize = 256;
const COMMAND_CHANNEL_CAPACITY: usize = 64;

enum ControllerCmd {
    Dispatch {
        event: InboundMessage,
        done: Option<oneshot::Sender<()>>,
    },
    PostReply {
        text: String,
        done: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Session>,
    },
    Shutdown,
}

/// Cloneable handle to a running [`ChatController`].
#[derive(Clone)]
pub struct ControllerHandle {
    cmd_tx: mpsc::Sender<ControllerCmd>,
    updates: broadcast::Sender<OutboundMessage>,
}

impl ControllerHandle {
    /// Queue an event and wait until it has been fully handled, including any
    /// simulated reply delay.
    pub async fn dispatch(&self, event: InboundMessage) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(ControllerCmd::Dispatch {
                event,
                done: Some(done_tx),
            })
            .await
            .map_err(|_| Error::ChannelClosed)?;
        done_rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Queue an event without waiting for it to be handled.
    pub async fn enqueue(&self, event: InboundMessage) -> Result<()> {
        self.cmd_tx
            .send(ControllerCmd::Dispatch { event, done: None })
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Parse and dispatch a raw event. Malformed events are dropped and
    /// reported as `Ok(false)`.
    pub async fn dispatch_raw(&self, raw: &Value) -> Result<bool> {
        match InboundMessage::parse(raw) {
            Some(event) => self.dispatch(event).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Host-initiated reply: `text` goes through the reply transform and is
    /// appended as an assistant message without a user turn.
    pub async fn post_reply(&self, text: impl Into<String>) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(ControllerCmd::PostReply {
                text: text.into(),
                done: done_tx,
            })
            .await
            .map_err(|_| Error::ChannelClosed)?;
        done_rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Current in-memory session, hydrating from the store if needed.
    pub async fn snapshot(&self) -> Result<Session> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(ControllerCmd::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.await.map_err(|_| Error::ChannelClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.updates.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.try_send(ControllerCmd::Shutdown);
    }
}

#[async_trait]
impl InboundSink for ControllerHandle {
    async fn send_inbound(&self, message: InboundMessage) -> Result<()> {
        self.enqueue(message).await
    }
}

impl OutboundSource for ControllerHandle {
    fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.updates.subscribe()
    }
}

/// Mediates between the session store and attached surfaces.
///
/// Commands are handled one at a time to completion, so every mutation of the
/// session is a single in-flight read-modify-write.
pub struct ChatController {
    state: ChatState,
    store: Arc<dyn SessionStore>,
    reply: ReplyConfig,
    updates: broadcast::Sender<OutboundMessage>,
}

impl ChatController {
    pub fn new(config: &AppConfig, store: Arc<dyn SessionStore>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BROADCAST_CAPACITY);
        Self {
            state: ChatState::new(config.model_registry.clone()),
            store,
            reply: config.reply,
            updates,
        }
    }

    /// Spawn the controller on the current runtime and return its handle.
    pub fn spawn(config: &AppConfig, store: Arc<dyn SessionStore>) -> ControllerHandle {
        let controller = Self::new(config, store);
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let handle = ControllerHandle {
            cmd_tx,
            updates: controller.updates.clone(),
        };
        tokio::spawn(controller.run(cmd_rx));
        handle
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<ControllerCmd>) {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                ControllerCmd::Dispatch { event, done } => {
                    tracing::debug!(target: "core.controller", kind = event.kind(), "Handling event");
                    self.ensure_hydrated().await;
                    let action = Action::from_inbound(event, current_timestamp());
                    self.handle_action(action).await;
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                }
                ControllerCmd::PostReply { text, done } => {
                    if text.trim().is_empty() {
                        let _ = done.send(());
                        continue;
                    }
                    self.ensure_hydrated().await;
                    let model = self.state.current_model();
                    let text = self.reply.compose(&model, &text);
                    self.handle_action(Action::AssistantReply {
                        message_id: MessageId::new(),
                        text,
                        timestamp: current_timestamp(),
                    })
                    .await;
                    let _ = done.send(());
                }
                ControllerCmd::Snapshot { reply } => {
                    self.ensure_hydrated().await;
                    let _ = reply.send(self.state.session.clone());
                }
                ControllerCmd::Shutdown => break,
            }
        }

        tracing::debug!(target: "core.controller", "Chat controller stopped");
    }

    async fn ensure_hydrated(&mut self) {
        if self.state.hydrated {
            return;
        }
        let session = self.store.load().await;
        tracing::debug!(
            target: "core.controller",
            messages = session.messages.len(),
            model_id = %session.model_id,
            "Session hydrated"
        );
        self.handle_action(Action::Hydrate { session }).await;
    }

    async fn handle_action(&mut self, action: Action) {
        let mut pending = VecDeque::from([action]);

        while let Some(action) = pending.pop_front() {
            for effect in reduce(&mut self.state, action) {
                if let Some(next) = self.handle_effect(effect).await {
                    pending.push_back(next);
                }
            }
        }
    }

    async fn handle_effect(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Emit(update) => {
                // No subscribers is not an error; the update is simply unseen.
                let _ = self.updates.send(update);
                None
            }

            Effect::Persist { session } => {
                if let Err(e) = self.store.save(&session).await {
                    tracing::error!(
                        target: "core.session_store",
                        error = %e,
                        messages = session.messages.len(),
                        "Failed to persist session"
                    );
                }
                None
            }

            Effect::GenerateReply { model_id, prompt } => {
                let model = self.state.registry.resolve(&model_id);
                let delay = self.reply.delay_for(&model);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                let text = self.reply.compose(&model, &prompt);
                tracing::debug!(
                    target: "core.controller",
                    model_id = %model.id,
                    pending = self.state.pending_replies,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Reply generated"
                );

                Some(Action::AssistantReply {
                    message_id: MessageId::new(),
                    text,
                    timestamp: current_timestamp(),
                })
            }
        }
    }
}
