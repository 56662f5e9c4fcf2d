//! Error types for quill-config

use thiserror::Error;

/// Errors from a key-value storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key `{0}`")]
    InvalidKey(String),
}

/// Errors raised while loading or persisting the configuration set
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Corrupt configuration data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
