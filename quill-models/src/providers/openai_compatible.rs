//! OpenAI-compatible HTTP provider client.
//!
//! Talks to any server exposing `GET /v1/models` and
//! `POST /v1/chat/completions` (OpenAI, DeepSeek, vLLM, LM Studio, proxies...).
//!
//! # Example
//!
//! ```ignore
//! use quill_models::providers::{GenerationRequest, OpenAiCompatibleClient, ProviderClient};
//!
//! let client = OpenAiCompatibleClient::new();
//! let models = client.get_models(&config).await?;
//! let result = client
//!     .generate_text(&config, &GenerationRequest::new("Outline an article about tides"))
//!     .await?;
//! ```

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::classify_status;
use crate::{ProviderConfig, ProviderError, Result};

use super::wire::{ChatCompletionRequest, parse_generation, parse_model_list};
use super::{ConnectionCheck, GenerationRequest, GenerationResult, ModelDescriptor};

const MODELS_PATH: &str = "/v1/models";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Stateless client for OpenAI-compatible APIs.
///
/// Holds only a pooled `reqwest::Client`; everything request-specific
/// (endpoint, credential, headers, timeout, retries) comes from the
/// [`ProviderConfig`] passed to each call.
#[derive(Debug, Clone, Default)]
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Create a client with a default connection pool.
    pub fn new() -> Self {
        Self::with_http_client(reqwest::Client::new())
    }

    /// Create a client on top of a preconfigured `reqwest::Client`.
    pub fn with_http_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch the model list, returning `None` when the body has no list.
    async fn fetch_models(&self, config: &ProviderConfig) -> Result<Option<Vec<ModelDescriptor>>> {
        let body = self.send(config, Method::GET, MODELS_PATH, None).await?;
        Ok(serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| parse_model_list(&value)))
    }

    /// Send a request, retrying transient failures up to `max_retries` times.
    ///
    /// Returns the raw body of an HTTP 200 response.
    async fn send(
        &self,
        config: &ProviderConfig,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<String> {
        let url = Url::parse(&config.api_url(path)).map_err(|e| {
            ProviderError::Request(format!("invalid API endpoint `{}`: {e}", config.endpoint))
        })?;
        let headers = request_headers(config)?;
        let attempts = config.max_retries.saturating_add(1);

        let mut attempt = 1;
        loop {
            let result = self
                .send_once(config, method.clone(), url.clone(), headers.clone(), body.clone())
                .await;
            match result {
                Err(err) if err.is_transient() && attempt < attempts => {
                    warn!(
                        provider = %config.name,
                        %url,
                        attempt,
                        max_attempts = attempts,
                        error = %err,
                        "transient provider failure, retrying"
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn send_once(
        &self,
        config: &ProviderConfig,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<String> {
        debug!(provider = %config.name, %method, %url, "sending provider request");

        let mut request = self
            .client
            .request(method, url)
            .headers(headers)
            .timeout(config.timeout());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e, config.timeout_secs))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(&e, config.timeout_secs))?;

        debug!(provider = %config.name, status = status.as_u16(), bytes = text.len(), "provider responded");

        if status != StatusCode::OK {
            return Err(classify_status(status, &text));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl super::ProviderClient for OpenAiCompatibleClient {
    async fn test_connection(&self, config: &ProviderConfig) -> Result<ConnectionCheck> {
        match self.fetch_models(config).await? {
            Some(models) => Ok(ConnectionCheck { models }),
            None => Err(ProviderError::MalformedResponse(
                "expected a model list in the `data` field".to_string(),
            )),
        }
    }

    async fn get_models(&self, config: &ProviderConfig) -> Result<Vec<ModelDescriptor>> {
        Ok(self.fetch_models(config).await?.unwrap_or_default())
    }

    async fn generate_text(
        &self,
        config: &ProviderConfig,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let payload = ChatCompletionRequest::from_generation(request, &config.model);
        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| ProviderError::Request(format!("failed to encode request: {e}")))?;

        let body = self
            .send(config, Method::POST, CHAT_COMPLETIONS_PATH, Some(bytes))
            .await?;
        let value = serde_json::from_str::<Value>(&body).unwrap_or_else(|e| {
            debug!(error = %e, "chat completion body is not JSON");
            Value::Null
        });
        Ok(parse_generation(&value, &payload.model))
    }
}

/// Build the header set for a provider request.
///
/// Custom headers are applied in order, then `Authorization: Bearer <key>` is
/// set unconditionally, then `Content-Type: application/json` unless a custom
/// header already chose a content type.
fn request_headers(config: &ProviderConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for header in &config.custom_headers {
        let name = HeaderName::from_bytes(header.key.trim().as_bytes()).map_err(|e| {
            ProviderError::Request(format!("invalid custom header name `{}`: {e}", header.key))
        })?;
        if name == AUTHORIZATION {
            warn!(provider = %config.name, "ignoring custom Authorization header");
            continue;
        }
        let value = HeaderValue::from_str(&header.value).map_err(|e| {
            ProviderError::Request(format!("invalid value for header `{}`: {e}", header.key))
        })?;
        headers.insert(name, value);
    }

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
        .map_err(|_| {
            ProviderError::Request(
                "API key contains characters that cannot be sent in a header".to_string(),
            )
        })?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(headers)
}
