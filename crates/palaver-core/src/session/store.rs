use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::state::Session;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Unsupported session record version {found}")]
    UnsupportedVersion { found: u32 },
}

impl StoreError {
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: format!("{err} (kind: {:?})", err.kind()),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Key-value persistence of the active session.
///
/// The store is a dumb persistence layer. Callers validate before writing.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Model id used when nothing has been persisted yet.
    fn default_model_id(&self) -> &str;

    /// Raw read of the persisted session. `Ok(None)` when nothing is stored.
    async fn read(&self) -> Result<Option<Session>, StoreError>;

    /// Replace the persisted session in one step.
    async fn write(&self, session: &Session) -> Result<(), StoreError>;

    /// Persisted session, or a fresh one on absence or read failure.
    async fn load(&self) -> Session {
        match self.read().await {
            Ok(Some(session)) => session,
            Ok(None) => Session::new(self.default_model_id()),
            Err(e) => {
                tracing::warn!(
                    target: "core.session_store",
                    error = %e,
                    "Failed to read persisted session, starting fresh"
                );
                Session::new(self.default_model_id())
            }
        }
    }

    /// Persist the full session. Last write wins.
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.write(session).await
    }

    /// Empty the message list, keeping the model id.
    async fn clear(&self) -> Result<(), StoreError> {
        let mut session = self.load().await;
        session.messages.clear();
        self.write(&session).await
    }
}

/// Store backed by process memory, for tests and ephemeral runs.
pub struct InMemorySessionStore {
    default_model_id: String,
    session: RwLock<Option<Session>>,
}

impl InMemorySessionStore {
    pub fn new(default_model_id: impl Into<String>) -> Self {
        Self {
            default_model_id: default_model_id.into(),
            session: RwLock::new(None),
        }
    }

    pub fn with_session(default_model_id: impl Into<String>, session: Session) -> Self {
        Self {
            default_model_id: default_model_id.into(),
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn default_model_id(&self) -> &str {
        &self.default_model_id
    }

    async fn read(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn write(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{Message, Role};

    #[tokio::test]
    async fn load_without_state_uses_default_model() {
        let store = InMemorySessionStore::new("grok-2");
        let session = store.load().await;
        assert!(session.messages.is_empty());
        assert_eq!(session.model_id, "grok-2");
    }

    #[tokio::test]
    async fn clear_keeps_model() {
        let mut session = Session::new("grok-mini");
        session.messages.push(Message::new(Role::User, "hi").unwrap());
        let store = InMemorySessionStore::with_session("grok-2", session);

        store.clear().await.unwrap();

        let loaded = store.load().await;
        assert!(loaded.messages.is_empty());
        assert_eq!(loaded.model_id, "grok-mini");
    }

    #[tokio::test]
    async fn save_is_last_write_wins() {
        let store = InMemorySessionStore::new("grok-2");
        let mut first = Session::new("grok-2");
        first.messages.push(Message::new(Role::User, "one").unwrap());
        let second = Session::new("grok-mini");

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await, second);
    }
}
