use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

/// In-memory store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    // ---
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        // ---
        let store = MemoryStore::new();

        store.set("plants", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("plants").await.unwrap().as_deref(), Some("[]"));

        store.set("plants", "[1]".to_string()).await.unwrap();
        assert_eq!(store.get("plants").await.unwrap().as_deref(), Some("[1]"));

        store.remove("plants").await.unwrap();
        assert!(store.get("plants").await.unwrap().is_none());

        // Removing a missing key is fine.
        store.remove("plants").await.unwrap();
    }
}
