//! The provider configuration store.
//!
//! [`ConfigStore`] owns the configuration set, the active selection and the
//! per-configuration model cache. It is an explicit context object: build
//! one, call [`init`](ConfigStore::init), share it behind an `Arc`, and call
//! [`close`](ConfigStore::close) on the way out.
//!
//! State is only mutated by the store's own operations and every accessor
//! returns a copy. Front ends that want to react to changes call
//! [`subscribe`](ConfigStore::subscribe) and receive a fresh
//! [`StoreSnapshot`] after each change.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use quill_models::providers::{GenerationRequest, GenerationResult, ProviderClient};
use quill_models::{
    ModelDescriptor, NewProviderConfig, OperationOutcome, ProviderConfig, ProviderConfigPatch,
};
use serde::{Serialize, Serializer};
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::StoreError;
use crate::status::{LoadingStatus, OperationId, OperationKind, OperationRecord, OperationTracker};
use crate::storage::{ACTIVE_CONFIG_KEY, CONFIGS_KEY, KeyValueStorage, MODEL_CACHE_KEY};

/// Message used when an operation names a configuration that does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Configuration not found";

/// Result of a store operation that addresses a configuration.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum StoreOutcome<T> {
    /// The operation ran; for network operations this means it succeeded.
    Done(T),
    /// No configuration with the given id (or no active configuration).
    NotFound,
    /// The operation ran and failed with a display-ready message.
    Failed(String),
}

impl<T> StoreOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            _ => None,
        }
    }

    /// Failure message, `None` for `Done` and `NotFound`.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StoreOutcome<U> {
        match self {
            Self::Done(value) => StoreOutcome::Done(f(value)),
            Self::NotFound => StoreOutcome::NotFound,
            Self::Failed(message) => StoreOutcome::Failed(message),
        }
    }
}

impl<T> From<StoreOutcome<T>> for OperationOutcome<T> {
    fn from(outcome: StoreOutcome<T>) -> Self {
        match outcome {
            StoreOutcome::Done(value) => OperationOutcome::success(value),
            StoreOutcome::NotFound => OperationOutcome::failure(NOT_FOUND_MESSAGE),
            StoreOutcome::Failed(message) => OperationOutcome::failure(message),
        }
    }
}

/// Result of a connection test, with latency measured around the whole call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub models: Vec<ModelDescriptor>,
}

impl ConnectionReport {
    fn failed(latency: Duration, error: String) -> Self {
        Self {
            success: false,
            latency,
            error: Some(error),
            models: Vec::new(),
        }
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Copy of the observable store state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub configs: Vec<ProviderConfig>,
    pub active_id: Option<String>,
    /// Model list most recently loaded for display.
    pub models: Vec<ModelDescriptor>,
    pub status: LoadingStatus,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    configs: Vec<ProviderConfig>,
    active_id: Option<String>,
    cache: HashMap<String, Vec<ModelDescriptor>>,
    models: Vec<ModelDescriptor>,
    models_for: Option<String>,
    last_error: Option<String>,
    tracker: OperationTracker,
}

impl StoreState {
    fn find(&self, id: &str) -> Option<&ProviderConfig> {
        self.configs.iter().find(|c| c.id == id)
    }

    fn show_models(&mut self, id: &str, models: Vec<ModelDescriptor>) {
        self.models = models;
        self.models_for = Some(id.to_string());
    }

    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            configs: self.configs.clone(),
            active_id: self.active_id.clone(),
            models: self.models.clone(),
            status: self.tracker.status().clone(),
            is_loading: self.tracker.is_loading(),
            error: self.last_error.clone(),
        }
    }
}

/// Owns provider configurations, the active selection and the model cache.
pub struct ConfigStore {
    state: RwLock<StoreState>,
    storage: Arc<dyn KeyValueStorage>,
    client: Arc<dyn ProviderClient>,
    /// Serializes writes so an older snapshot never lands after a newer one.
    persist_lock: Mutex<()>,
    snapshots: watch::Sender<StoreSnapshot>,
}

impl ConfigStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, client: Arc<dyn ProviderClient>) -> Self {
        let (snapshots, _) = watch::channel(StoreSnapshot::default());
        Self {
            state: RwLock::new(StoreState::default()),
            storage,
            client,
            persist_lock: Mutex::new(()),
            snapshots,
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────

    /// Load the configuration set, then restore the previously active id and
    /// the model cache for configurations that still exist.
    pub async fn init(&self) {
        let _ = self.load().await;
        let cached = self.read_cache().await;

        let stored = match self.storage.get(ACTIVE_CONFIG_KEY).await {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read active configuration id");
                self.record_error(format!("Failed to load active configuration: {e}"))
                    .await;
                None
            }
        };

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let configs = &state.configs;
        let restored = stored.filter(|id| configs.iter().any(|c| &c.id == id));
        let cache: HashMap<_, _> = cached
            .into_iter()
            .filter(|(id, _)| configs.iter().any(|c| &c.id == id))
            .collect();
        state.active_id = restored;
        state.cache = cache;
        info!(
            configs = state.configs.len(),
            active = ?state.active_id,
            cached = state.cache.len(),
            "configuration store initialized"
        );
        self.publish(state);
    }

    /// Persist the configuration set, the active pointer and the model cache
    /// one final time.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.persist().await?;
        self.persist_active().await?;
        self.persist_cache().await?;
        info!("configuration store closed");
        Ok(())
    }

    /// Replace the in-memory set with what storage holds.
    ///
    /// Unreadable or corrupt data leaves the set empty and is reported
    /// through [`last_error`](Self::last_error) as well as the outcome.
    #[instrument(skip(self))]
    pub async fn load(&self) -> StoreOutcome<usize> {
        let op = self.begin(OperationKind::Load).await;
        let loaded = self.read_configs().await;

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let outcome = match loaded {
            Ok(configs) => {
                let count = configs.len();
                state.configs = configs;
                state.tracker.finish(op, Ok(()));
                debug!(count, "loaded configurations");
                StoreOutcome::Done(count)
            }
            Err(e) => {
                let message = format!("Failed to load configurations: {e}");
                warn!(error = %e, "failed to load configurations");
                state.configs.clear();
                state.last_error = Some(message.clone());
                state.tracker.finish(op, Err(message.clone()));
                StoreOutcome::Failed(message)
            }
        };

        let configs = &state.configs;
        state.cache.retain(|id, _| configs.iter().any(|c| &c.id == id));
        if let Some(active) = &state.active_id {
            if !configs.iter().any(|c| &c.id == active) {
                state.active_id = None;
            }
        }
        if let Some(shown) = &state.models_for {
            if !configs.iter().any(|c| &c.id == shown) {
                state.models.clear();
                state.models_for = None;
            }
        }

        self.publish(state);
        outcome
    }

    /// Write the configuration set to storage.
    pub async fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let content = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&state.configs)?
        };
        self.storage.set(CONFIGS_KEY, &content).await?;
        debug!(bytes = content.len(), "persisted configurations");
        Ok(())
    }

    async fn persist_active(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let active = self.state.read().await.active_id.clone();
        match active {
            Some(id) => self.storage.set(ACTIVE_CONFIG_KEY, &id).await?,
            None => self.storage.remove(ACTIVE_CONFIG_KEY).await?,
        }
        Ok(())
    }

    /// Write the model cache, removing the key once the cache is empty.
    async fn persist_cache(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let content = {
            let state = self.state.read().await;
            if state.cache.is_empty() {
                None
            } else {
                Some(serde_json::to_string(&state.cache)?)
            }
        };
        match content {
            Some(content) => self.storage.set(MODEL_CACHE_KEY, &content).await?,
            None => self.storage.remove(MODEL_CACHE_KEY).await?,
        }
        Ok(())
    }

    /// Unreadable or corrupt cache data yields an empty cache.
    async fn read_cache(&self) -> HashMap<String, Vec<ModelDescriptor>> {
        let raw = match self.storage.get(MODEL_CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                warn!(error = %e, "failed to read model cache");
                return HashMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring corrupt model cache");
            HashMap::new()
        })
    }

    async fn read_configs(&self) -> Result<Vec<ProviderConfig>, StoreError> {
        let Some(raw) = self.storage.get(CONFIGS_KEY).await? else {
            return Ok(Vec::new());
        };
        let parsed: Vec<ProviderConfig> = serde_json::from_str(&raw)?;

        let mut seen = HashSet::new();
        Ok(parsed
            .into_iter()
            .filter(|config| {
                let fresh = seen.insert(config.id.clone());
                if !fresh {
                    warn!(id = %config.id, "dropping configuration with duplicate id");
                }
                fresh
            })
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────
    // Configuration set
    // ─────────────────────────────────────────────────────────────────

    /// Assign a fresh id and timestamps, append, and persist.
    pub async fn add(&self, new: NewProviderConfig) -> ProviderConfig {
        let config = {
            let mut state = self.state.write().await;
            let id = loop {
                let candidate = Uuid::new_v4().to_string();
                if state.find(&candidate).is_none() {
                    break candidate;
                }
            };
            let config = new.into_config(id, Utc::now());
            state.configs.push(config.clone());
            self.publish(&state);
            config
        };

        info!(id = %config.id, name = %config.name, "added provider configuration");
        let result = self.persist().await;
        self.note_persist_failure(result).await;
        config
    }

    /// Merge `patch` into the configuration and bump its `updated_at`.
    pub async fn update(&self, id: &str, patch: ProviderConfigPatch) -> StoreOutcome<ProviderConfig> {
        let updated = {
            let mut state = self.state.write().await;
            let Some(config) = state.configs.iter_mut().find(|c| c.id == id) else {
                debug!(id, "update of unknown configuration");
                return StoreOutcome::NotFound;
            };
            config.apply(patch, Utc::now());
            let updated = config.clone();
            self.publish(&state);
            updated
        };

        info!(id, "updated provider configuration");
        let result = self.persist().await;
        self.note_persist_failure(result).await;
        StoreOutcome::Done(updated)
    }

    /// Remove a configuration together with its cached models. Clears the
    /// active selection when it pointed here.
    pub async fn remove(&self, id: &str) -> StoreOutcome<ProviderConfig> {
        let (removed, was_active, had_cache) = {
            let mut state = self.state.write().await;
            let Some(index) = state.configs.iter().position(|c| c.id == id) else {
                debug!(id, "remove of unknown configuration");
                return StoreOutcome::NotFound;
            };
            let removed = state.configs.remove(index);
            let had_cache = state.cache.remove(id).is_some();
            if state.models_for.as_deref() == Some(id) {
                state.models.clear();
                state.models_for = None;
            }
            let was_active = state.active_id.as_deref() == Some(id);
            if was_active {
                state.active_id = None;
            }
            self.publish(&state);
            (removed, was_active, had_cache)
        };

        info!(id, was_active, "removed provider configuration");
        let result = self.persist().await;
        self.note_persist_failure(result).await;
        if was_active {
            let result = self.persist_active().await;
            self.note_persist_failure(result).await;
        }
        if had_cache {
            self.save_cache().await;
        }
        StoreOutcome::Done(removed)
    }

    /// Select the configuration used for generation, or clear the selection.
    ///
    /// Selecting an unknown id leaves the current selection unchanged.
    pub async fn set_active(&self, id: Option<&str>) -> StoreOutcome<Option<String>> {
        {
            let mut state = self.state.write().await;
            if let Some(id) = id {
                if state.find(id).is_none() {
                    debug!(id, "cannot activate unknown configuration");
                    return StoreOutcome::NotFound;
                }
            }
            state.active_id = id.map(str::to_string);
            self.publish(&state);
        }

        info!(active = ?id, "active configuration changed");
        let result = self.persist_active().await;
        self.note_persist_failure(result).await;
        StoreOutcome::Done(id.map(str::to_string))
    }

    // ─────────────────────────────────────────────────────────────────
    // Provider operations
    // ─────────────────────────────────────────────────────────────────

    /// Test a configuration, which need not be stored yet.
    ///
    /// Always returns a report; failures of any kind land in its `error`.
    #[instrument(skip(self, config), fields(config_id = %config.id))]
    pub async fn test_connection(&self, config: &ProviderConfig) -> ConnectionReport {
        let op = self.begin(OperationKind::TestConnection).await;
        let started = Instant::now();

        let client = Arc::clone(&self.client);
        let target = config.clone();
        let result = run_isolated(async move { client.test_connection(&target).await }).await;
        let latency = started.elapsed();

        let report = match result {
            Ok(check) => ConnectionReport {
                success: true,
                latency,
                error: None,
                models: check.models,
            },
            Err(message) => ConnectionReport::failed(latency, message),
        };
        debug!(
            success = report.success,
            latency_ms = latency.as_millis() as u64,
            "connection test finished"
        );

        self.finish(op, report.error.clone().map_or(Ok(()), Err)).await;
        report
    }

    /// Test a stored configuration by id.
    pub async fn test_connection_by_id(&self, id: &str) -> StoreOutcome<ConnectionReport> {
        match self.get(id).await {
            Some(config) => StoreOutcome::Done(self.test_connection(&config).await),
            None => StoreOutcome::NotFound,
        }
    }

    /// Models for a configuration, served from the cache unless
    /// `force_refresh` is set.
    ///
    /// A failed fetch leaves any earlier cache entry untouched.
    #[instrument(skip(self))]
    pub async fn load_models(
        &self,
        id: &str,
        force_refresh: bool,
    ) -> StoreOutcome<Vec<ModelDescriptor>> {
        let config = {
            let mut state = self.state.write().await;
            let Some(config) = state.find(id).cloned() else {
                return StoreOutcome::NotFound;
            };
            if !force_refresh {
                if let Some(cached) = state.cache.get(id).cloned() {
                    debug!(count = cached.len(), "model cache hit");
                    state.show_models(id, cached.clone());
                    self.publish(&state);
                    return StoreOutcome::Done(cached);
                }
            }
            config
        };

        let op = self.begin(OperationKind::LoadModels).await;
        let client = Arc::clone(&self.client);
        let result = run_isolated(async move { client.get_models(&config).await }).await;

        let mut cached = false;
        let outcome = {
            let mut state = self.state.write().await;
            let outcome = match result {
                Ok(models) => {
                    // Last write wins; a configuration removed mid-flight is not re-cached.
                    if state.find(id).is_some() {
                        state.cache.insert(id.to_string(), models.clone());
                        state.show_models(id, models.clone());
                        cached = true;
                    }
                    info!(count = models.len(), "loaded models");
                    state.tracker.finish(op, Ok(()));
                    StoreOutcome::Done(models)
                }
                Err(message) => {
                    warn!(error = %message, "failed to load models");
                    state.last_error = Some(message.clone());
                    state.tracker.finish(op, Err(message.clone()));
                    StoreOutcome::Failed(message)
                }
            };
            self.publish(&state);
            outcome
        };

        if cached {
            self.save_cache().await;
        }
        outcome
    }

    /// Drop the cache entry for one configuration and fetch again.
    pub async fn refresh_models(&self, id: &str) -> StoreOutcome<Vec<ModelDescriptor>> {
        {
            let mut state = self.state.write().await;
            if state.find(id).is_none() {
                return StoreOutcome::NotFound;
            }
            state.cache.remove(id);
        }
        let outcome = self.load_models(id, true).await;
        if !matches!(outcome, StoreOutcome::Done(_)) {
            self.save_cache().await;
        }
        outcome
    }

    /// Drop every cache entry and the displayed model list.
    pub async fn clear_all_model_cache(&self) {
        {
            let mut state = self.state.write().await;
            let dropped = state.cache.len();
            state.cache.clear();
            state.models.clear();
            state.models_for = None;
            info!(dropped, "cleared model cache");
            self.publish(&state);
        }
        self.save_cache().await;
    }

    /// Generate text through the active configuration.
    #[instrument(skip(self, request))]
    pub async fn generate_text(&self, request: &GenerationRequest) -> StoreOutcome<GenerationResult> {
        let Some(config) = self.active_config().await else {
            debug!("no active configuration for generation");
            return StoreOutcome::NotFound;
        };

        let op = self.begin(OperationKind::GenerateText).await;
        let client = Arc::clone(&self.client);
        let request = request.clone();
        let result =
            run_isolated(async move { client.generate_text(&config, &request).await }).await;

        match result {
            Ok(generated) => {
                self.finish(op, Ok(())).await;
                StoreOutcome::Done(generated)
            }
            Err(message) => {
                warn!(error = %message, "text generation failed");
                self.record_error(message.clone()).await;
                self.finish(op, Err(message.clone())).await;
                StoreOutcome::Failed(message)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────

    pub async fn configs(&self) -> Vec<ProviderConfig> {
        self.state.read().await.configs.clone()
    }

    pub async fn get(&self, id: &str) -> Option<ProviderConfig> {
        self.state.read().await.find(id).cloned()
    }

    pub async fn active_id(&self) -> Option<String> {
        self.state.read().await.active_id.clone()
    }

    pub async fn active_config(&self) -> Option<ProviderConfig> {
        let state = self.state.read().await;
        state
            .active_id
            .as_deref()
            .and_then(|id| state.find(id))
            .cloned()
    }

    /// Configurations whose own `is_active` flag is set.
    pub async fn enabled_configs(&self) -> Vec<ProviderConfig> {
        let state = self.state.read().await;
        state.configs.iter().filter(|c| c.is_active).cloned().collect()
    }

    /// The model list most recently loaded for display.
    pub async fn models(&self) -> Vec<ModelDescriptor> {
        self.state.read().await.models.clone()
    }

    pub async fn cached_models(&self, id: &str) -> Option<Vec<ModelDescriptor>> {
        self.state.read().await.cache.get(id).cloned()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Clear the last error and return the status to idle when nothing is
    /// in flight.
    pub async fn clear_error(&self) {
        let mut state = self.state.write().await;
        state.last_error = None;
        state.tracker.reset();
        self.publish(&state);
    }

    pub async fn status(&self) -> LoadingStatus {
        self.state.read().await.tracker.status().clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.tracker.is_loading()
    }

    pub async fn operation(&self, id: OperationId) -> Option<OperationRecord> {
        self.state.read().await.tracker.get(id).cloned()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.snapshot()
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────

    async fn begin(&self, kind: OperationKind) -> OperationId {
        let mut state = self.state.write().await;
        state.last_error = None;
        let id = state.tracker.begin(kind);
        debug!(operation = %id, ?kind, "operation started");
        self.publish(&state);
        id
    }

    async fn finish(&self, id: OperationId, outcome: Result<(), String>) {
        let mut state = self.state.write().await;
        state.tracker.finish(id, outcome);
        self.publish(&state);
    }

    async fn record_error(&self, message: String) {
        let mut state = self.state.write().await;
        state.last_error = Some(message);
        self.publish(&state);
    }

    async fn note_persist_failure(&self, result: Result<(), StoreError>) {
        if let Err(e) = result {
            warn!(error = %e, "failed to save configurations");
            self.record_error(format!("Failed to save configurations: {e}"))
                .await;
        }
    }

    /// Cache write failures are logged and never reach `last_error`.
    async fn save_cache(&self) {
        if let Err(e) = self.persist_cache().await {
            warn!(error = %e, "failed to save model cache");
        }
    }

    fn publish(&self, state: &StoreState) {
        self.snapshots.send_replace(state.snapshot());
    }
}

/// Run a provider call on its own task so a panic inside a client
/// implementation comes back as a failure message.
async fn run_isolated<T, F>(call: F) -> Result<T, String>
where
    F: Future<Output = quill_models::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => {
            warn!(error = %e, "provider task ended abnormally");
            Err(format!("Unexpected failure: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_models::ProviderError;
    use quill_models::providers::ConnectionCheck;

    use crate::storage::MemoryStorage;

    /// Client that panics on every call.
    struct PanickingClient;

    #[async_trait]
    impl ProviderClient for PanickingClient {
        async fn test_connection(
            &self,
            _config: &ProviderConfig,
        ) -> quill_models::Result<ConnectionCheck> {
            panic!("client bug")
        }

        async fn get_models(
            &self,
            _config: &ProviderConfig,
        ) -> quill_models::Result<Vec<ModelDescriptor>> {
            Err(ProviderError::ServerError)
        }

        async fn generate_text(
            &self,
            _config: &ProviderConfig,
            _request: &GenerationRequest,
        ) -> quill_models::Result<GenerationResult> {
            panic!("client bug")
        }
    }

    fn store() -> ConfigStore {
        ConfigStore::new(Arc::new(MemoryStorage::new()), Arc::new(PanickingClient))
    }

    fn sample() -> NewProviderConfig {
        NewProviderConfig::new("Local", "http://localhost:1234", "sk-test", "llama3")
    }

    // ─────────────────────────────────────────────────────────────────
    // StoreOutcome
    // ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_outcome_helpers() {
        let done: StoreOutcome<u32> = StoreOutcome::Done(2);
        assert!(done.is_done());
        assert_eq!(done.clone().map(|n| n * 2), StoreOutcome::Done(4));
        assert_eq!(done.done(), Some(2));

        let failed: StoreOutcome<u32> = StoreOutcome::Failed("HTTP 500".into());
        assert_eq!(failed.error(), Some("HTTP 500"));
        assert!(StoreOutcome::<u32>::NotFound.is_not_found());
    }

    #[test]
    fn test_outcome_into_operation_outcome() {
        let outcome: OperationOutcome<u32> = StoreOutcome::<u32>::NotFound.into();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(NOT_FOUND_MESSAGE));
    }

    #[test]
    fn test_connection_report_serializes_latency_in_millis() {
        let report = ConnectionReport::failed(Duration::from_millis(250), "HTTP 500".into());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["latency_ms"], 250);
        assert_eq!(json["success"], false);
    }

    // ─────────────────────────────────────────────────────────────────
    // Failure isolation
    // ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_panicking_client_yields_failed_report() {
        let store = store();
        let config = store.add(sample()).await;

        let report = store.test_connection(&config).await;
        assert!(!report.success);
        assert!(report.error.unwrap().starts_with("Unexpected failure"));
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn test_panicking_generation_is_failed_outcome() {
        let store = store();
        let config = store.add(sample()).await;
        let _ = store.set_active(Some(&config.id)).await;

        let outcome = store.generate_text(&GenerationRequest::new("hi")).await;
        assert!(outcome.error().is_some());
        assert!(store.last_error().await.is_some());
        assert!(matches!(store.status().await, LoadingStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_clear_error_returns_to_idle() {
        let store = store();
        let config = store.add(sample()).await;

        let outcome = store.load_models(&config.id, false).await;
        assert!(outcome.error().is_some());
        assert!(store.cached_models(&config.id).await.is_none());

        store.clear_error().await;
        assert!(store.last_error().await.is_none());
        assert_eq!(store.status().await, LoadingStatus::Idle);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = store();
        let mut rx = store.subscribe();

        let config = store.add(sample()).await;
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.configs.len(), 1);

        let _ = store.set_active(Some(&config.id)).await;
        assert_eq!(rx.borrow_and_update().active_id.as_deref(), Some(config.id.as_str()));
    }
}
