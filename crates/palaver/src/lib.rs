pub mod cli;
pub mod commands;
pub mod error;

pub use palaver_core::{app, model_registry, preferences, session, surface, utils};

use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, eyre};
use palaver_core::app::{AppConfig, ChatController, ControllerHandle, InboundMessage};
use palaver_core::preferences::Preferences;
use palaver_core::session::{FileSessionStore, InMemorySessionStore, SessionStore};

/// Settings shared by every command that talks to a controller.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    pub preferences: Preferences,
    pub model: Option<String>,
    pub state_file: Option<PathBuf>,
    pub catalogs: Vec<PathBuf>,
    pub ephemeral: bool,
}

/// A running controller plus the configuration it was built from.
pub struct ChatRuntime {
    pub config: AppConfig,
    pub handle: ControllerHandle,
    /// `None` when the conversation only lives in memory.
    pub state_file: Option<PathBuf>,
}

impl RuntimeOptions {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    pub fn app_config(&self) -> Result<AppConfig> {
        AppConfig::from_preferences(&self.preferences, &self.catalogs)
            .map_err(|e| eyre!("Failed to load model catalog: {}", e))
    }

    /// Resolve the state file: `--state-file`, then preferences, then the
    /// user data directory.
    pub fn resolve_state_file(&self) -> Option<PathBuf> {
        self.state_file
            .clone()
            .or_else(|| self.preferences.state_file())
    }

    /// Build the store, spawn the controller and apply `--model` if given.
    pub async fn start(&self) -> Result<ChatRuntime> {
        let config = self.app_config()?;
        let default_model = config.model_registry.default_id().to_string();

        let (store, state_file): (Arc<dyn SessionStore>, Option<PathBuf>) = if self.ephemeral {
            (
                Arc::new(InMemorySessionStore::new(default_model)) as Arc<dyn SessionStore>,
                None,
            )
        } else {
            let path = self
                .resolve_state_file()
                .ok_or_else(|| eyre!("Failed to determine a state file location"))?;
            (
                Arc::new(FileSessionStore::new(path.clone(), default_model)) as Arc<dyn SessionStore>,
                Some(path),
            )
        };

        tracing::debug!(
            target: "palaver::runtime",
            ephemeral = self.ephemeral,
            state_file = ?state_file,
            "Starting chat controller"
        );

        let handle = ChatController::spawn(&config, store);

        if let Some(model) = &self.model {
            handle
                .dispatch(InboundMessage::SetModel { id: model.clone() })
                .await
                .map_err(|e| eyre!("Failed to select model '{}': {}", model, e))?;
        }

        Ok(ChatRuntime {
            config,
            handle,
            state_file,
        })
    }
}
