//! Rendering side of the chat loop.
//!
//! A [`ChatSurface`] owns nothing but its rendered projection. It turns user
//! actions into [`InboundMessage`]s and applies [`OutboundMessage`]s from the
//! controller. Rendered items are append-only: once an item is on screen its
//! text is never changed.

use std::collections::VecDeque;

use crate::app::protocol::{InboundMessage, OutboundMessage};
use crate::preferences::DEFAULT_GREETING;
use crate::session::{Message, MessageId, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Ready,
}

/// Where a rendered item came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOrigin {
    /// Shown before the first controller round trip completes.
    Placeholder,
    /// Optimistic echo of the user's own input, awaiting its controller id.
    Pending,
    Confirmed(MessageId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub origin: ItemOrigin,
    pub role: Role,
    pub text: String,
    pub timestamp: Option<u64>,
}

impl RenderedItem {
    fn from_message(message: Message) -> Self {
        Self {
            origin: ItemOrigin::Confirmed(message.id),
            role: message.role,
            text: message.text,
            timestamp: Some(message.timestamp),
        }
    }

    pub fn id(&self) -> Option<&MessageId> {
        match &self.origin {
            ItemOrigin::Confirmed(id) => Some(id),
            _ => None,
        }
    }
}

/// Key presses the composer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter { shift: bool },
    Backspace,
}

#[derive(Debug, Clone)]
pub struct ChatSurface {
    state: SurfaceState,
    items: Vec<RenderedItem>,
    /// Indices into `items` of optimistic echoes, oldest first.
    pending: VecDeque<usize>,
    model_label: Option<String>,
    model_id: Option<String>,
    draft: String,
    greeting: String,
}

impl Default for ChatSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSurface {
    pub fn new() -> Self {
        Self::with_greeting(DEFAULT_GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            state: SurfaceState::Uninitialized,
            items: Vec::new(),
            pending: VecDeque::new(),
            model_label: None,
            model_id: None,
            draft: String::new(),
            greeting: greeting.into(),
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn items(&self) -> &[RenderedItem] {
        &self.items
    }

    pub fn model_label(&self) -> Option<&str> {
        self.model_label.as_deref()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Attach to a controller. Renders the greeting if nothing is shown yet
    /// and returns the state request to send.
    pub fn attach(&mut self) -> InboundMessage {
        if self.items.is_empty() && !self.greeting.trim().is_empty() {
            self.items.push(RenderedItem {
                origin: ItemOrigin::Placeholder,
                role: Role::Assistant,
                text: self.greeting.clone(),
                timestamp: None,
            });
        }
        self.state = SurfaceState::Ready;
        InboundMessage::RequestState
    }

    /// Apply a controller update.
    pub fn apply(&mut self, update: OutboundMessage) {
        match update {
            OutboundMessage::State { messages } => {
                self.items = messages.into_iter().map(RenderedItem::from_message).collect();
                self.pending.clear();
            }
            OutboundMessage::Append { message } => self.append(message),
            OutboundMessage::Cleared => {
                self.items.clear();
                self.pending.clear();
            }
            OutboundMessage::Model { id, label } => {
                self.model_id = Some(id);
                self.model_label = Some(label);
            }
        }
    }

    fn append(&mut self, message: Message) {
        if self
            .items
            .iter()
            .any(|item| item.id() == Some(&message.id))
        {
            return;
        }

        if message.role == Role::User {
            if let Some(&idx) = self.pending.front() {
                if self.items.get(idx).is_some_and(|item| item.text == message.text) {
                    self.pending.pop_front();
                    if let Some(item) = self.items.get_mut(idx) {
                        item.origin = ItemOrigin::Confirmed(message.id);
                        item.timestamp = Some(message.timestamp);
                    }
                    return;
                }
            }
        }

        self.items.push(RenderedItem::from_message(message));
    }

    /// Send the given text. Blank input emits nothing.
    pub fn submit(&mut self, text: &str) -> Option<InboundMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.pending.push_back(self.items.len());
        self.items.push(RenderedItem {
            origin: ItemOrigin::Pending,
            role: Role::User,
            text: text.to_string(),
            timestamp: None,
        });

        Some(InboundMessage::Send {
            text: text.to_string(),
        })
    }

    /// Feed a key press to the composer. Enter without Shift sends the draft.
    pub fn key(&mut self, key: KeyInput) -> Option<InboundMessage> {
        match key {
            KeyInput::Char(c) => {
                self.draft.push(c);
                None
            }
            KeyInput::Backspace => {
                self.draft.pop();
                None
            }
            KeyInput::Enter { shift: true } => {
                self.draft.push('\n');
                None
            }
            KeyInput::Enter { shift: false } => {
                let draft = std::mem::take(&mut self.draft);
                let event = self.submit(&draft);
                if event.is_none() {
                    self.draft = draft;
                }
                event
            }
        }
    }

    pub fn clear(&self) -> InboundMessage {
        InboundMessage::Clear
    }

    /// "New chat" is a clear from the controller's point of view.
    pub fn new_chat(&mut self) -> InboundMessage {
        self.draft.clear();
        InboundMessage::Clear
    }

    pub fn select_model(&self, id: &str) -> InboundMessage {
        InboundMessage::SetModel { id: id.to_string() }
    }

    /// Plain-text projection, one entry per rendered item.
    pub fn render_lines(&self) -> Vec<String> {
        self.items.iter().map(render_item).collect()
    }
}

pub fn render_item(item: &RenderedItem) -> String {
    let who = match item.role {
        Role::User => "you",
        Role::Assistant => "ai",
        Role::System => "system",
    };
    format!("{who}> {}", item.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: Role, text: &str) -> Message {
        Message::new(role, text).unwrap()
    }

    #[test]
    fn attach_requests_state_and_shows_greeting() {
        let mut surface = ChatSurface::new();
        assert_eq!(surface.state(), SurfaceState::Uninitialized);

        assert_eq!(surface.attach(), InboundMessage::RequestState);
        assert_eq!(surface.state(), SurfaceState::Ready);
        assert_eq!(surface.items().len(), 1);
        assert_eq!(surface.items()[0].origin, ItemOrigin::Placeholder);
        assert_eq!(surface.items()[0].text, DEFAULT_GREETING);
    }

    #[test]
    fn reattach_does_not_duplicate_greeting() {
        let mut surface = ChatSurface::new();
        surface.attach();
        surface.attach();
        assert_eq!(surface.items().len(), 1);
    }

    #[test]
    fn state_replaces_everything() {
        let mut surface = ChatSurface::new();
        surface.attach();
        let messages = vec![msg(Role::User, "a"), msg(Role::Assistant, "b")];
        surface.apply(OutboundMessage::State {
            messages: messages.clone(),
        });

        assert_eq!(surface.items().len(), 2);
        assert_eq!(surface.items()[0].id(), Some(&messages[0].id));
        assert_eq!(surface.render_lines(), vec!["you> a", "ai> b"]);
    }

    #[test]
    fn append_leaves_earlier_items_untouched() {
        let mut surface = ChatSurface::new();
        surface.apply(OutboundMessage::State {
            messages: vec![msg(Role::Assistant, "first")],
        });
        let before = surface.items()[0].clone();

        surface.apply(OutboundMessage::Append {
            message: msg(Role::Assistant, "second"),
        });

        assert_eq!(surface.items()[0], before);
        assert_eq!(surface.items()[1].text, "second");
    }

    #[test]
    fn optimistic_echo_is_reconciled_by_id() {
        let mut surface = ChatSurface::new();
        surface.apply(OutboundMessage::State { messages: vec![] });

        let event = surface.submit("  hello  ").unwrap();
        assert_eq!(event, InboundMessage::Send { text: "hello".into() });
        assert_eq!(surface.items()[0].origin, ItemOrigin::Pending);

        let confirmed = msg(Role::User, "hello");
        surface.apply(OutboundMessage::Append {
            message: confirmed.clone(),
        });
        surface.apply(OutboundMessage::Append {
            message: msg(Role::Assistant, "Grok 2 (demo): hello"),
        });

        assert_eq!(surface.items().len(), 2);
        assert_eq!(surface.items()[0].id(), Some(&confirmed.id));
        assert_eq!(surface.items()[0].text, "hello");
    }

    #[test]
    fn unmatched_user_append_is_rendered() {
        let mut surface = ChatSurface::new();
        surface.submit("mine").unwrap();
        surface.apply(OutboundMessage::Append {
            message: msg(Role::User, "from another view"),
        });

        assert_eq!(surface.items().len(), 2);
        assert_eq!(surface.items()[0].origin, ItemOrigin::Pending);
    }

    #[test]
    fn duplicate_append_is_ignored() {
        let mut surface = ChatSurface::new();
        let message = msg(Role::Assistant, "once");
        surface.apply(OutboundMessage::Append {
            message: message.clone(),
        });
        surface.apply(OutboundMessage::Append { message });
        assert_eq!(surface.items().len(), 1);
    }

    #[test]
    fn blank_submit_emits_nothing() {
        let mut surface = ChatSurface::new();
        assert_eq!(surface.submit("   "), None);
        assert!(surface.items().is_empty());
    }

    #[test]
    fn enter_sends_and_shift_enter_newlines() {
        let mut surface = ChatSurface::new();
        for c in "hi".chars() {
            assert_eq!(surface.key(KeyInput::Char(c)), None);
        }
        assert_eq!(surface.key(KeyInput::Enter { shift: true }), None);
        surface.key(KeyInput::Char('x'));
        assert_eq!(surface.draft(), "hi\nx");

        let event = surface.key(KeyInput::Enter { shift: false });
        assert_eq!(event, Some(InboundMessage::Send { text: "hi\nx".into() }));
        assert_eq!(surface.draft(), "");
    }

    #[test]
    fn cleared_and_model_updates() {
        let mut surface = ChatSurface::new();
        surface.attach();
        surface.apply(OutboundMessage::Model {
            id: "grok-mini".into(),
            label: "Grok Mini (demo)".into(),
        });
        surface.apply(OutboundMessage::Cleared);

        assert!(surface.items().is_empty());
        assert_eq!(surface.model_label(), Some("Grok Mini (demo)"));
        assert_eq!(surface.model_id(), Some("grok-mini"));
        assert_eq!(
            surface.select_model("grok-2"),
            InboundMessage::SetModel { id: "grok-2".into() }
        );
        assert_eq!(surface.clear(), InboundMessage::Clear);
    }
}
