use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::utils::paths::AppPaths;

const DEFAULT_MODELS_TOML: &str = include_str!("../assets/default_models.toml");

/// Context size reported for ids that are not in any catalog.
pub const FALLBACK_CONTEXT_TOKENS: u32 = 8192;

/// Simulated latency for ids that are not in any catalog.
pub const FALLBACK_LATENCY_MS: u64 = 250;

/// Display metadata for a selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub label: String,
    pub context_tokens: u32,

    /// Per-model constant driving the simulated reply delay.
    #[serde(default)]
    pub latency_ms: u64,

    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ModelInfo {
    /// Entry for an id no catalog knows about: the id doubles as the label.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            context_tokens: FALLBACK_CONTEXT_TOKENS,
            latency_ms: FALLBACK_LATENCY_MS,
            aliases: Vec::new(),
        }
    }
}

/// Root structure for TOML deserialization.
#[derive(Debug, Default, Deserialize, Serialize)]
struct ModelsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_model: Option<String>,
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// Registry containing all selectable models.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    /// Catalog order is display order.
    models: Vec<ModelInfo>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    default_id: String,
}

impl ModelRegistry {
    /// Registry built only from the bundled catalog.
    pub fn builtin() -> Result<Self, Error> {
        let file = Self::parse_builtin()?;
        Self::from_file(file)
    }

    /// Load the registry, merging built-in, user, project and explicit catalogs.
    ///
    /// Merge order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. User-level catalog
    /// 3. Project-level catalog
    /// 4. Each path in `catalog_paths`
    pub fn load(catalog_paths: &[PathBuf]) -> Result<Self, Error> {
        let mut models_file = Self::parse_builtin()?;

        for path in AppPaths::discover_catalogs() {
            if let Some(overlay) = Self::load_config_from_path(&path)? {
                Self::merge_models(&mut models_file, overlay);
            }
        }

        for path in catalog_paths {
            match Self::load_config_from_path(path)? {
                Some(overlay) => Self::merge_models(&mut models_file, overlay),
                None => tracing::warn!("Catalog path does not exist: {}", path.display()),
            }
        }

        Self::from_file(models_file)
    }

    /// Build a registry directly from a list of models.
    pub fn from_models(models: Vec<ModelInfo>, default_id: &str) -> Result<Self, Error> {
        Self::from_file(ModelsFile {
            default_model: Some(default_id.to_string()),
            models,
        })
    }

    /// Resolve an id or alias. Unknown ids resolve to an entry labelled with
    /// the id itself.
    pub fn resolve(&self, id: &str) -> ModelInfo {
        self.get(id)
            .cloned()
            .unwrap_or_else(|| ModelInfo::unknown(id))
    }

    /// Get a model by id, falling back to alias lookup.
    pub fn get(&self, id: &str) -> Option<&ModelInfo> {
        self.index
            .get(id)
            .or_else(|| self.aliases.get(id))
            .and_then(|idx| self.models.get(*idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All models in catalog order.
    pub fn list_all(&self) -> &[ModelInfo] {
        &self.models
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Return a copy whose default is `id`, if the id is known.
    pub fn with_default(mut self, id: &str) -> Result<Self, Error> {
        let canonical = self
            .get(id)
            .map(|model| model.id.clone())
            .ok_or_else(|| Error::Configuration(format!("Unknown default model '{id}'")))?;
        self.default_id = canonical;
        Ok(self)
    }

    fn parse_builtin() -> Result<ModelsFile, Error> {
        toml::from_str(DEFAULT_MODELS_TOML)
            .map_err(|e| Error::Configuration(format!("Failed to parse default models: {e}")))
    }

    fn from_file(file: ModelsFile) -> Result<Self, Error> {
        let mut registry = Self {
            models: Vec::with_capacity(file.models.len()),
            index: HashMap::new(),
            aliases: HashMap::new(),
            default_id: String::new(),
        };

        for model in file.models {
            if model.context_tokens == 0 {
                return Err(Error::Configuration(format!(
                    "Model '{}' must declare a positive context_tokens",
                    model.id
                )));
            }

            let idx = registry.models.len();
            for alias in &model.aliases {
                registry.aliases.insert(alias.clone(), idx);
            }
            registry.index.insert(model.id.clone(), idx);
            registry.models.push(model);
        }

        let default_id = file
            .default_model
            .or_else(|| registry.models.first().map(|m| m.id.clone()))
            .ok_or_else(|| Error::Configuration("Model catalog is empty".to_string()))?;

        if !registry.index.contains_key(&default_id) {
            return Err(Error::Configuration(format!(
                "Default model '{default_id}' is not in the catalog"
            )));
        }
        registry.default_id = default_id;

        Ok(registry)
    }

    /// Load a catalog from a specific path. Missing files yield `None`.
    fn load_config_from_path(path: &Path) -> Result<Option<ModelsFile>, Error> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;

        let models = toml::from_str(&content).map_err(|e| {
            Error::Configuration(format!(
                "Failed to parse models at {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %path.display(), "Loaded model catalog");
        Ok(Some(models))
    }

    /// Merge overlay models into the base file.
    /// Aliases are appended, scalar fields use last-write-wins.
    fn merge_models(base: &mut ModelsFile, overlay: ModelsFile) {
        let mut existing: HashMap<String, usize> = base
            .models
            .iter()
            .enumerate()
            .map(|(idx, model)| (model.id.clone(), idx))
            .collect();

        for model in overlay.models {
            if let Some(&idx) = existing.get(&model.id) {
                let base_model = &mut base.models[idx];
                for alias in model.aliases {
                    if !base_model.aliases.contains(&alias) {
                        base_model.aliases.push(alias);
                    }
                }
                base_model.label = model.label;
                base_model.context_tokens = model.context_tokens;
                if model.latency_ms > 0 {
                    base_model.latency_ms = model.latency_ms;
                }
            } else {
                existing.insert(model.id.clone(), base.models.len());
                base.models.push(model);
            }
        }

        if overlay.default_model.is_some() {
            base.default_model = overlay.default_model;
        }
    }
}
