use super::types::{
    ProviderDefaults, QuillConfig, RawProviderDefaults, RawQuillConfig, RawStorageConfig,
    StorageConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the project config directory (useful for isolated e2e tests)
pub const PROJECT_CONFIG_DIR_ENV: &str = "QUILL_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<QuillConfig> {
        Self::load_layers(&[Self::user_config_path(), Self::project_config_path()])
    }

    /// Load and merge the given files in order; missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<QuillConfig> {
        let mut raw = RawQuillConfig::default();
        for path in paths {
            if let Some(layer) = Self::read_layer(path)? {
                debug!(path = %path.display(), "loaded config layer");
                raw = Self::merge_raw(raw, layer);
            }
        }
        Ok(Self::finalize(raw))
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        quill_paths::user_config_file()
    }

    /// Get project config path
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".quill/config.toml")
        }
    }

    fn read_layer(path: &Path) -> Result<Option<RawQuillConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let layer = toml::from_str(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(Some(layer))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawQuillConfig, overlay: RawQuillConfig) -> RawQuillConfig {
        RawQuillConfig {
            storage: RawStorageConfig {
                dir: overlay.storage.dir.or(base.storage.dir),
            },
            provider: RawProviderDefaults {
                timeout_secs: overlay.provider.timeout_secs.or(base.provider.timeout_secs),
                max_retries: overlay.provider.max_retries.or(base.provider.max_retries),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawQuillConfig) -> QuillConfig {
        let defaults = ProviderDefaults::default();
        QuillConfig {
            storage: raw
                .storage
                .dir
                .map(|dir| StorageConfig { dir })
                .unwrap_or_default(),
            provider: ProviderDefaults {
                timeout_secs: raw.provider.timeout_secs.unwrap_or(defaults.timeout_secs),
                max_retries: raw.provider.max_retries.unwrap_or(defaults.max_retries),
            },
        }
    }
}
