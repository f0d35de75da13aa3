use std::sync::Arc;

use crate::error::Result;
use crate::model_registry::ModelRegistry;
use crate::preferences::Preferences;

pub mod domain;
pub mod io;
pub mod protocol;

pub use domain::reply::ReplyConfig;
pub use domain::runtime::{ChatController, ControllerHandle};
pub use protocol::{InboundMessage, OutboundMessage};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_registry: Arc<ModelRegistry>,
    pub reply: ReplyConfig,
}

impl AppConfig {
    pub fn new(model_registry: Arc<ModelRegistry>) -> Self {
        Self {
            model_registry,
            reply: ReplyConfig::default(),
        }
    }

    /// Build from preferences and the catalog files on disk.
    pub fn from_preferences(
        preferences: &Preferences,
        catalog_paths: &[std::path::PathBuf],
    ) -> Result<Self> {
        let mut registry = ModelRegistry::load(catalog_paths)?;
        if let Some(default_model) = &preferences.default_model {
            registry = registry.with_default(default_model)?;
        }

        let reply = preferences
            .reply
            .to_config()
            .fitted_to(registry.list_all());

        Ok(Self {
            model_registry: Arc::new(registry),
            reply,
        })
    }

    pub fn with_reply(mut self, reply: ReplyConfig) -> Self {
        self.reply = reply;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::reply::min_reply_chars;

    #[test]
    fn from_preferences_raises_reply_limit_to_fit_labels() {
        let mut preferences = Preferences::default();
        preferences.reply.max_chars = 0;

        let config = AppConfig::from_preferences(&preferences, &[]).unwrap();

        let floor = config
            .model_registry
            .list_all()
            .iter()
            .map(|model| min_reply_chars(&model.label))
            .max()
            .unwrap();
        assert_eq!(config.reply.max_chars, floor);
        assert!(config.reply.max_chars >= min_reply_chars("Grok Mini (demo)"));
    }

    #[test]
    fn from_preferences_keeps_roomy_limit() {
        let config = AppConfig::from_preferences(&Preferences::default(), &[]).unwrap();
        assert_eq!(config.reply.max_chars, 500);
    }
}
