//! Serializable success/failure envelope.
//!
//! Inside the process, provider operations return `Result<T, ProviderError>`.
//! Front ends that render results (or print them as JSON) want the flat
//! `{ success, data, error }` shape instead, with the error already turned
//! into its display message.

use serde::{Deserialize, Serialize};

use crate::ProviderError;

/// Uniform result shape handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> OperationOutcome<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Convert back into a `Result`, keeping only the error message.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(error),
            _ => Err("operation returned no data".to_string()),
        }
    }
}

impl<T> From<Result<T, ProviderError>> for OperationOutcome<T> {
    fn from(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}
