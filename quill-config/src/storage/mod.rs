//! Durable key-value storage for the configuration store.
//!
//! The store keeps the serialized configuration array under [`CONFIGS_KEY`],
//! the active configuration id under [`ACTIVE_CONFIG_KEY`] (absent when
//! nothing is selected) and the model lists fetched so far under
//! [`MODEL_CACHE_KEY`].

mod file;
mod memory;

use async_trait::async_trait;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::StorageError;

/// Key holding the JSON array of provider configurations.
pub const CONFIGS_KEY: &str = "ai-configs";

/// Key holding the active configuration id as a plain string.
pub const ACTIVE_CONFIG_KEY: &str = "active-config-id";

/// Key holding a JSON object of configuration id to cached model list.
pub const MODEL_CACHE_KEY: &str = "model-cache";

/// String-valued key-value storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read a value, `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
