//! Provider client for quill.
//!
//! This crate provides:
//! - Provider connection profiles ([`ProviderConfig`]) with redacted credentials
//! - The [`ProviderClient`](providers::ProviderClient) trait and an
//!   OpenAI-compatible implementation over reqwest
//! - Deterministic classification of HTTP and transport failures into
//!   user-facing messages ([`ProviderError`])
//! - Heuristic model capability and kind inference ([`infer`])
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     ConfigStore                       │
//! │             (quill-config, model cache)               │
//! └──────────────────────────────────────────────────────┘
//!                           │ dyn ProviderClient
//!                           ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               OpenAiCompatibleClient                  │
//! │   GET /v1/models        POST /v1/chat/completions     │
//! └──────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod outcome;
mod types;

pub mod infer;
pub mod providers;

pub use config::{
    ApiKey, CustomHeader, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, NewProviderConfig,
    ProviderConfig, ProviderConfigPatch, next_timestamp,
};
pub use error::{ProviderError, Result, classify_status};
pub use outcome::OperationOutcome;
pub use types::{Availability, Capability, ModelDescriptor, ModelDescriptorBuilder, ModelKind};
