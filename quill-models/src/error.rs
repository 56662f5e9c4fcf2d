//! Error types for provider operations.
//!
//! Every variant's `Display` output is the message shown to the user, so the
//! wording here is part of the contract with the front end.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Classified failure of a provider request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// HTTP 401.
    #[error("Invalid API key: the provider rejected the credential (HTTP 401)")]
    InvalidCredential,

    /// HTTP 403.
    #[error("Access denied: the API key does not have permission for this resource (HTTP 403)")]
    AccessDenied,

    /// HTTP 404.
    #[error("Endpoint not found: check the API address (HTTP 404)")]
    EndpointNotFound,

    /// HTTP 429.
    #[error("Rate limited: too many requests, please retry later (HTTP 429)")]
    RateLimited,

    /// HTTP 500.
    #[error("Server error: the provider failed to handle the request, please retry later (HTTP 500)")]
    ServerError,

    /// Any other status whose body carried `{"error": {"message": ...}}`.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Any other status without a structured error body.
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The request was sent but no response came back.
    #[error("Cannot reach server: check your network connection and the API address")]
    Unreachable { detail: String },

    /// The transport gave up waiting for a response.
    #[error(
        "Cannot reach server: no response within {secs}s, check your network connection and the API address"
    )]
    Timeout { secs: u64 },

    /// HTTP 200 with a payload that does not have the expected shape.
    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),

    /// The request could not be built, so it was never sent.
    #[error("{0}")]
    Request(String),
}

impl ProviderError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } | Self::RateLimited | Self::ServerError => {
                true
            }
            Self::Api { status, .. } | Self::Status { status, .. } => {
                matches!(status, 502..=504)
            }
            _ => false,
        }
    }

    /// Whether the failure happened before any response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }

    /// The HTTP status behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidCredential => Some(401),
            Self::AccessDenied => Some(403),
            Self::EndpointNotFound => Some(404),
            Self::RateLimited => Some(429),
            Self::ServerError => Some(500),
            Self::Api { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Map a transport error from reqwest.
    ///
    /// `timeout_secs` is the timeout that was in force, reported back to the
    /// user when the request timed out.
    pub fn from_transport(error: &reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            Self::Timeout { secs: timeout_secs }
        } else if error.is_builder() {
            Self::Request(error.to_string())
        } else {
            Self::Unreachable {
                detail: error.to_string(),
            }
        }
    }
}

/// Classify a non-200 response into a [`ProviderError`].
pub fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 => ProviderError::InvalidCredential,
        403 => ProviderError::AccessDenied,
        404 => ProviderError::EndpointNotFound,
        429 => ProviderError::RateLimited,
        500 => ProviderError::ServerError,
        code => match structured_error_message(body) {
            Some(message) => ProviderError::Api {
                status: code,
                message,
            },
            None => ProviderError::Status {
                status: code,
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
            },
        },
    }
}

/// Extract `error.message` from an OpenAI-style error body.
fn structured_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}
