use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{KeyValueStore, StoreError};

/// All keys kept in a single JSON object on disk.
///
/// Every write rewrites the whole document through a temporary file and a
/// rename, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating nothing until the first write.
    ///
    /// An unreadable document is logged and treated as empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        // ---
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), "ignoring unreadable store file: {}", e);
                HashMap::new()
            })
        } else {
            HashMap::new()
        };

        info!(path = %path.display(), keys = data.len(), "file store opened");

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, data: &HashMap<String, String>) -> Result<(), StoreError> {
        // ---
        let contents = serde_json::to_string_pretty(data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "file store flushed");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    // ---
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), value);
        self.flush(&data)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.remove(key).is_some() {
            self.flush(&data)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("plant-care-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        // ---
        let path = temp_path();

        let store = FileStore::open(&path).unwrap();
        store.set("plants", r#"[{"id":"1"}]"#.to_string()).await.unwrap();
        store.set("other", "{}".to_string()).await.unwrap();
        store.remove("other").await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("plants").await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
        assert!(reopened.get("other").await.unwrap().is_none());

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_opens_empty() {
        // ---
        let path = temp_path();
        std::fs::write(&path, "not a json document").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.get("plants").await.unwrap().is_none());

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_created_on_open() {
        // ---
        let path = temp_path();
        let store = FileStore::open(&path).unwrap();

        assert!(!store.path().exists());
        assert!(store.get("plants").await.unwrap().is_none());
    }
}
