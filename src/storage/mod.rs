//! Storage adapter for the plant and notification collections.
//!
//! The adapter persists JSON documents through a [`KeyValueStore`]
//! backend. Reads never fail: a missing, unreadable or malformed record is
//! logged and replaced by an empty collection (or default settings), so
//! callers always get a renderable state. Writes report their error and
//! leave recovery to the caller.
//!
//! Backends:
//! - [`MemoryStore`]: process-local map, used by tests and ephemeral runs
//! - [`FileStore`]: one JSON document on disk
//! - [`PgStore`]: a `kv_store` table in PostgreSQL

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{Notification, Plant};
use crate::settings::Settings;

mod file;
mod memory;
mod postgres;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

// ---

/// Record keys.
pub mod keys {
    pub const PLANTS: &str = "connected_plant_care_plants";
    pub const NOTIFICATIONS: &str = "connected_plant_care_notifications";
    pub const SETTINGS: &str = "appSettings";
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key-value store. Each `set` is a complete overwrite of its key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Typed access to the persisted records.
#[derive(Clone)]
pub struct PlantStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PlantStore {
    // ---
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Adapter over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn load_plants(&self) -> Vec<Plant> {
        self.load_or_default(keys::PLANTS).await
    }

    pub async fn save_plants(&self, plants: &[Plant]) -> Result<(), StoreError> {
        self.save_json(keys::PLANTS, &plants).await
    }

    pub async fn load_notifications(&self) -> Vec<Notification> {
        self.load_or_default(keys::NOTIFICATIONS).await
    }

    pub async fn save_notifications(
        &self,
        notifications: &[Notification],
    ) -> Result<(), StoreError> {
        self.save_json(keys::NOTIFICATIONS, &notifications).await
    }

    pub async fn load_settings(&self) -> Settings {
        self.load_or_default(keys::SETTINGS).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.save_json(keys::SETTINGS, settings).await
    }

    /// Remove the plant and notification records. Settings are kept.
    pub async fn clear_all_data(&self) -> Result<(), StoreError> {
        // ---
        self.backend.remove(keys::PLANTS).await?;
        self.backend.remove(keys::NOTIFICATIONS).await?;
        debug!(backend = self.backend.name(), "cleared plant data");
        Ok(())
    }

    async fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        // ---
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!(key, backend = self.backend.name(), "failed to read record: {}", e);
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "discarding malformed record: {}", e);
                T::default()
            }
        }
    }

    async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        // ---
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, raw).await
    }
}
