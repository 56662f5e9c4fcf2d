//! Provider configuration store for quill.
//!
//! This crate provides:
//! - [`ConfigStore`]: the configuration set, active selection and per-configuration
//!   model cache, driving a [`ProviderClient`](quill_models::providers::ProviderClient)
//! - [`KeyValueStorage`] with file-backed and in-memory implementations
//! - Per-operation loading status ([`OperationTracker`])
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quill_config::{ConfigStore, FileStorage};
//! use quill_models::{NewProviderConfig, providers::OpenAiCompatibleClient};
//!
//! let store = ConfigStore::new(
//!     Arc::new(FileStorage::default_location()),
//!     Arc::new(OpenAiCompatibleClient::new()),
//! );
//! store.init().await;
//! let config = store
//!     .add(NewProviderConfig::new("OpenAI", "https://api.openai.com", key, "gpt-4o"))
//!     .await;
//! let _ = store.set_active(Some(&config.id)).await;
//! ```

mod error;
mod status;
mod storage;
mod store;

pub use error::{StorageError, StoreError};
pub use status::{
    HISTORY_LIMIT, LoadingStatus, OperationId, OperationKind, OperationRecord, OperationStatus,
    OperationTracker,
};
pub use storage::{
    ACTIVE_CONFIG_KEY, CONFIGS_KEY, FileStorage, KeyValueStorage, MODEL_CACHE_KEY, MemoryStorage,
};
pub use store::{ConfigStore, ConnectionReport, NOT_FOUND_MESSAGE, StoreOutcome, StoreSnapshot};
