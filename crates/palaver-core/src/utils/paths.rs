use std::path::PathBuf;

/// Standardized application directories for Palaver.
///
/// - Project-level: ./.palaver
/// - User-level config: uses OS-specific dirs
/// - User-level data: uses OS-specific dirs
pub struct AppPaths;

impl AppPaths {
    /// Return the project-level .palaver directory (relative to current working dir)
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".palaver")
    }

    /// Return the project-level catalog path: ./.palaver/models.toml
    pub fn project_catalog() -> PathBuf {
        Self::project_dir().join("models.toml")
    }

    /// Return the user-level config directory (platform-specific)
    pub fn user_config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "palaver").map(|d| d.config_dir().to_path_buf())
    }

    /// Return the user-level data directory (platform-specific)
    pub fn user_data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "palaver").map(|d| d.data_dir().to_path_buf())
    }

    /// Return the user-level catalog path (platform-specific)
    pub fn user_catalog() -> Option<PathBuf> {
        Self::user_config_dir().map(|d| d.join("models.toml"))
    }

    /// Default key-value state file holding the persisted session
    pub fn default_state_file() -> Option<PathBuf> {
        Self::user_data_dir().map(|d| d.join("state.json"))
    }

    /// Directory for log files
    pub fn log_dir() -> Option<PathBuf> {
        Self::user_data_dir().map(|d| d.join("logs"))
    }

    /// Catalog discovery order. User catalog first, project catalog second, so
    /// project entries override user entries when merged.
    pub fn discover_catalogs() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(user_cat) = Self::user_catalog() {
            paths.push(user_cat);
        }
        paths.push(Self::project_catalog());
        paths
    }
}
