pub mod config;
pub mod generate;
pub mod models;
pub mod providers;

use std::sync::Arc;

use anyhow::{Result, bail};
use quill_config::{ConfigStore, FileStorage};
use quill_models::ProviderConfig;
use quill_models::providers::OpenAiCompatibleClient;
use tracing::{debug, warn};

use crate::config::QuillConfig;

/// Everything a provider-facing command needs.
pub struct Context {
    pub store: ConfigStore,
    pub settings: QuillConfig,
    pub json: bool,
}

impl Context {
    /// Open the profile store described by `settings` and load it.
    pub async fn open(settings: QuillConfig, json: bool) -> Self {
        debug!(dir = %settings.storage.dir.display(), "opening profile store");
        let store = ConfigStore::new(
            Arc::new(FileStorage::new(&settings.storage.dir)),
            Arc::new(OpenAiCompatibleClient::new()),
        );
        store.init().await;
        if let Some(error) = store.last_error().await {
            warn!(%error, "profile store loaded with errors");
        }
        Self {
            store,
            settings,
            json,
        }
    }

    /// Refuse to write when loading failed, so unreadable data is not
    /// replaced by an empty set.
    pub async fn ensure_writable(&self) -> Result<()> {
        if let Some(error) = self.store.last_error().await {
            bail!(
                "{error}\nFix or remove the files in {} before changing profiles.",
                self.settings.storage.dir.display()
            );
        }
        Ok(())
    }

    /// Resolve a profile reference, or the active profile when none is given.
    pub async fn resolve_or_active(&self, reference: Option<&str>) -> Result<ProviderConfig> {
        match reference {
            Some(reference) => {
                let configs = self.store.configs().await;
                let id = resolve_id(&configs, reference)?;
                configs
                    .into_iter()
                    .find(|c| c.id == id)
                    .ok_or_else(|| anyhow::anyhow!("Profile '{reference}' not found"))
            }
            None => match self.store.active_config().await {
                Some(config) => Ok(config),
                None => bail!("No active profile. Select one with: quill providers use <profile>"),
            },
        }
    }
}

/// Resolve a reference to a profile id: exact id, unique id prefix, or
/// case-insensitive name.
pub fn resolve_id(configs: &[ProviderConfig], reference: &str) -> Result<String> {
    if let Some(config) = configs.iter().find(|c| c.id == reference) {
        return Ok(config.id.clone());
    }

    let by_prefix: Vec<_> = configs
        .iter()
        .filter(|c| c.id.starts_with(reference))
        .collect();
    match by_prefix.as_slice() {
        [config] => return Ok(config.id.clone()),
        [] => {}
        _ => bail!("Profile id prefix '{reference}' is ambiguous"),
    }

    let by_name: Vec<_> = configs
        .iter()
        .filter(|c| c.name.eq_ignore_ascii_case(reference))
        .collect();
    match by_name.as_slice() {
        [config] => Ok(config.id.clone()),
        [] => bail!("Profile '{reference}' not found"),
        _ => bail!("Several profiles are named '{reference}'; use the id instead"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_models::NewProviderConfig;

    fn profiles() -> Vec<ProviderConfig> {
        let now = Utc::now();
        vec![
            NewProviderConfig::new("OpenAI", "https://api.openai.com", "k", "gpt-4o")
                .into_config("a1b2c3d4-0000", now),
            NewProviderConfig::new("Local", "http://localhost:8080", "k", "llama3")
                .into_config("a1ffffff-1111", now),
            NewProviderConfig::new("local", "http://localhost:9090", "k", "qwen")
                .into_config("b7777777-2222", now),
        ]
    }

    #[test]
    fn resolves_exact_id() {
        assert_eq!(resolve_id(&profiles(), "a1b2c3d4-0000").unwrap(), "a1b2c3d4-0000");
    }

    #[test]
    fn resolves_unique_prefix() {
        assert_eq!(resolve_id(&profiles(), "b7").unwrap(), "b7777777-2222");
    }

    #[test]
    fn rejects_ambiguous_prefix() {
        let err = resolve_id(&profiles(), "a1").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn resolves_name_case_insensitively() {
        assert_eq!(resolve_id(&profiles(), "openai").unwrap(), "a1b2c3d4-0000");
    }

    #[test]
    fn rejects_duplicate_names_and_unknown() {
        assert!(resolve_id(&profiles(), "LOCAL").is_err());
        assert!(resolve_id(&profiles(), "anthropic").is_err());
    }
}
