use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app::domain::reply::{DEFAULT_MAX_REPLY_CHARS, ReplyConfig};
use crate::error::Error;
use crate::utils::paths::AppPaths;

pub const DEFAULT_GREETING: &str = "Hi! This is a stubbed demo chat.";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Preferences {
    pub default_model: Option<String>,

    #[serde(default)]
    pub reply: ReplyPreferences,

    #[serde(default)]
    pub ui: UiPreferences,

    #[serde(default)]
    pub storage: StoragePreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplyPreferences {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_latency_scale")]
    pub latency_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiPreferences {
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default)]
    pub show_timestamps: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoragePreferences {
    /// Overrides the default state file location.
    pub state_file: Option<PathBuf>,
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_REPLY_CHARS
}

fn default_latency_scale() -> f64 {
    1.0
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

impl Default for ReplyPreferences {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            latency_scale: default_latency_scale(),
        }
    }
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            show_timestamps: false,
        }
    }
}

impl ReplyPreferences {
    pub fn to_config(&self) -> ReplyConfig {
        ReplyConfig {
            max_chars: self.max_chars,
            latency_scale: self.latency_scale,
        }
    }
}

impl Preferences {
    /// Get the path to the preferences file
    pub fn config_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            Error::Configuration("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("palaver").join("preferences.toml"))
    }

    /// Load preferences from disk, or return defaults if not found
    pub fn load() -> Result<Self, Error> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        match toml::from_str(&contents) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse preferences file at {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save preferences to disk
    pub fn save(&self) -> Result<(), Error> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize preferences: {e}")))?;

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// State file to use: explicit preference, else the user data dir.
    pub fn state_file(&self) -> Option<PathBuf> {
        self.storage
            .state_file
            .clone()
            .or_else(AppPaths::default_state_file)
    }
}
