//! Provider connection profiles.
//!
//! A [`ProviderConfig`] is what the configuration store persists: endpoint,
//! credential, default model and transport knobs for one OpenAI-compatible
//! API. The JSON field names match the storage format (`apiEndpoint`,
//! `modelIdentifier`, ...), so entries written by earlier front ends load
//! unchanged.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries on transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A provider credential that stays out of logs.
///
/// Wrapped in `SecretString`, so `Debug` prints `ApiKey([REDACTED])` and the
/// value is zeroized on drop. It still serializes as the plain string because
/// the configuration set is persisted verbatim.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Create a new API key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Expose the secret key value.
    ///
    /// Use sparingly - only when building the Authorization header or persisting.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose_secret())
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// One extra header sent with every request to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomHeader {
    pub key: String,
    pub value: String,
}

impl CustomHeader {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// A named set of connection parameters for one AI API endpoint.
///
/// `id`, `created_at` and `updated_at` are assigned by the configuration
/// store; `id` never changes after creation and `updated_at` strictly
/// increases on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "apiEndpoint")]
    pub endpoint: String,
    pub api_key: ApiKey,
    #[serde(rename = "modelIdentifier")]
    pub model: String,
    /// Applied in order; a later entry for the same header wins.
    #[serde(default)]
    pub custom_headers: Vec<CustomHeader>,
    #[serde(rename = "timeout", default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderConfig {
    /// Transport timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join an API path onto the endpoint, tolerating a trailing slash.
    ///
    /// ```
    /// # use quill_models::NewProviderConfig;
    /// let config = NewProviderConfig::new("local", "http://localhost:8080/", "key", "m")
    ///     .into_config("id-1", chrono::Utc::now());
    /// assert_eq!(config.api_url("/v1/models"), "http://localhost:8080/v1/models");
    /// ```
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Merge a patch into this configuration and bump `updated_at`.
    pub fn apply(&mut self, patch: ProviderConfigPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(endpoint) = patch.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(api_key) = patch.api_key {
            self.api_key = api_key;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(headers) = patch.custom_headers {
            self.custom_headers = headers;
        }
        if let Some(timeout_secs) = patch.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(max_retries) = patch.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.touch(now);
    }

    /// Advance `updated_at` to `now`, or one millisecond past its current
    /// value when the clock has not moved forward.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = next_timestamp(self.updated_at, now);
    }
}

/// Smallest timestamp that is both `>= now` and strictly after `previous`.
///
/// Millisecond steps survive the RFC 3339 round trip through storage.
pub fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + TimeDelta::milliseconds(1);
    if now >= floor { now } else { floor }
}

/// A provider configuration before the store assigns identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProviderConfig {
    pub name: String,
    pub endpoint: String,
    pub api_key: ApiKey,
    pub model: String,
    pub custom_headers: Vec<CustomHeader>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub is_active: bool,
}

impl NewProviderConfig {
    /// Create a configuration with default timeout, retries and no extra headers.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<ApiKey>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            custom_headers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            is_active: true,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push(CustomHeader::new(key, value));
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Stamp identity and creation time.
    pub fn into_config(self, id: impl Into<String>, now: DateTime<Utc>) -> ProviderConfig {
        ProviderConfig {
            id: id.into(),
            name: self.name,
            endpoint: self.endpoint,
            api_key: self.api_key,
            model: self.model,
            custom_headers: self.custom_headers,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a [`ProviderConfig`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfigPatch {
    pub name: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<ApiKey>,
    pub model: Option<String>,
    pub custom_headers: Option<Vec<CustomHeader>>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub is_active: Option<bool>,
}

impl ProviderConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
