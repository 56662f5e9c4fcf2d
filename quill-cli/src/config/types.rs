use quill_models::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawQuillConfig {
    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub provider: RawProviderDefaults,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    /// Directory holding provider profiles
    pub dir: Option<PathBuf>,
}

/// Provider defaults as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawProviderDefaults {
    /// Request timeout in seconds for new profiles
    pub timeout_secs: Option<u64>,

    /// Retries for transient failures on new profiles
    pub max_retries: Option<u32>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuillConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub provider: ProviderDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: quill_paths::data_dir(),
        }
    }
}

/// Applied to profiles created without explicit values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDefaults {
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}
