use std::sync::Arc;

use crate::model_registry::{ModelInfo, ModelRegistry};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ChatState {
    pub session: Session,
    pub registry: Arc<ModelRegistry>,
    /// False until the persisted session has been loaded.
    pub hydrated: bool,
    pub pending_replies: usize,
}

impl ChatState {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        let session = Session::new(registry.default_id());
        Self {
            session,
            registry,
            hydrated: false,
            pending_replies: 0,
        }
    }

    pub fn current_model(&self) -> ModelInfo {
        self.registry.resolve(&self.session.model_id)
    }
}
