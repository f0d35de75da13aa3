use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::state::Session;
use super::store::{SessionStore, StoreError};

/// Namespaced key under which the chat session lives in the state file.
pub const SESSION_KEY: &str = "palaver.chat.session";

const RECORD_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    version: u32,
    #[serde(flatten)]
    session: Session,
}

/// Session store backed by a JSON key-value state file.
///
/// Keys other than [`SESSION_KEY`] are preserved on write. Writes land in a
/// temporary sibling file that is then renamed over the target.
pub struct FileSessionStore {
    path: PathBuf,
    default_model_id: String,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>, default_model_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_model_id: default_model_id.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StoreError::io(self.path.display().to_string(), &e)),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::serialization("state file root is not an object")),
            Err(e) => Err(StoreError::serialization(e.to_string())),
        }
    }

    async fn write_map(&self, map: Map<String, Value>) -> Result<(), StoreError> {
        let display = self.path.display().to_string();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::io(parent.display().to_string(), &e))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(&Value::Object(map))
            .map_err(|e| StoreError::serialization(e.to_string()))?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "state.json".to_string());
        let tmp_path = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| StoreError::io(tmp_path.display().to_string(), &e))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::io(display, &e));
        }

        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn default_model_id(&self) -> &str {
        &self.default_model_id
    }

    async fn read(&self) -> Result<Option<Session>, StoreError> {
        let mut map = self.read_map().await?;
        let Some(value) = map.remove(SESSION_KEY) else {
            return Ok(None);
        };

        let record: SessionRecord =
            serde_json::from_value(value).map_err(|e| StoreError::serialization(e.to_string()))?;

        if record.version > RECORD_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: record.version,
            });
        }

        Ok(Some(record.session))
    }

    async fn write(&self, session: &Session) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        // A corrupt file is replaced rather than blocking every future write.
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    target: "core.session_store",
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable state file"
                );
                Map::new()
            }
        };

        let record = SessionRecord {
            version: RECORD_VERSION,
            session: session.clone(),
        };
        let value =
            serde_json::to_value(&record).map_err(|e| StoreError::serialization(e.to_string()))?;
        map.insert(SESSION_KEY.to_string(), value);

        self.write_map(map).await?;

        tracing::debug!(
            target: "core.session_store",
            path = %self.path.display(),
            messages = session.messages.len(),
            "Session persisted"
        );
        Ok(())
    }
}
