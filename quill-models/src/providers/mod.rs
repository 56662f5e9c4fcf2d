//! Provider client trait and the OpenAI-compatible implementation.
//!
//! The [`ProviderClient`] trait is the seam between the configuration store
//! and the network: the store only ever talks to `dyn ProviderClient`, which
//! keeps it testable without a server.
//!
//! # Example
//!
//! ```ignore
//! use quill_models::providers::{GenerationRequest, ProviderClient};
//!
//! async fn draft(client: &dyn ProviderClient, config: &ProviderConfig) {
//!     let result = client
//!         .generate_text(config, &GenerationRequest::new("Draft an intro paragraph"))
//!         .await?;
//!     println!("{}", result.content);
//! }
//! ```

mod openai_compatible;
mod types;
pub mod wire;

use async_trait::async_trait;

pub use openai_compatible::OpenAiCompatibleClient;
pub use types::*;

use crate::{ModelDescriptor, ProviderConfig, Result};

/// Translates domain operations into provider API calls.
///
/// Implementations are stateless with respect to configurations: every call
/// receives the [`ProviderConfig`] to use. Failures come back as classified
/// [`ProviderError`](crate::ProviderError)s whose display text is ready for
/// the user; implementations never panic on provider input.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Check that the provider answers a model-list request with HTTP 200
    /// and a model list.
    async fn test_connection(&self, config: &ProviderConfig) -> Result<ConnectionCheck>;

    /// List the provider's models.
    ///
    /// A 200 response without a parseable list yields an empty list; only
    /// transport and HTTP status failures are errors.
    async fn get_models(&self, config: &ProviderConfig) -> Result<Vec<ModelDescriptor>>;

    /// Run a single-prompt chat completion.
    async fn generate_text(
        &self,
        config: &ProviderConfig,
        request: &GenerationRequest,
    ) -> Result<GenerationResult>;
}
