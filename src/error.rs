//! Error types for Azure OpenAI chat operations.
//!
//! Every failure in the request flow maps to one [`LlmError`] variant and
//! surfaces unmodified at the process boundary; there is no local recovery
//! or retry anywhere in this crate.
//!
//! | Error | Cause |
//! |-------|-------|
//! | `ConfigError` | Required environment variable missing or empty |
//! | `AuthError` | Empty API key, or no credential source produced a token |
//! | `ApiError` | Non-2xx response from the service |
//! | `NetworkError` / `Timeout` | Transport failure before a response arrived |
//! | `EmptyResponse` | 2xx response with zero choices |

use thiserror::Error;

/// Result type for chat client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur while resolving credentials or issuing a chat request.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Required configuration is missing or empty.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Authentication failed before the chat request was attempted.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Non-success response from the API.
    #[error("API error: {0}")]
    ApiError(String),

    /// Network-level failure.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Malformed request or response body.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The service returned a completion with no choices.
    #[error("Response contained no choices")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::NetworkError(format!("Connection failed: {}", err))
        } else {
            LlmError::NetworkError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = LlmError::ConfigError("AZURE_AI_ENDPOINT not set".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: AZURE_AI_ENDPOINT not set"
        );
    }

    #[test]
    fn test_auth_error_display() {
        let error = LlmError::AuthError("API key is empty".to_string());
        assert_eq!(error.to_string(), "Authentication error: API key is empty");
    }

    #[test]
    fn test_api_error_display() {
        let error = LlmError::ApiError("deployment not found".to_string());
        assert_eq!(error.to_string(), "API error: deployment not found");
    }

    #[test]
    fn test_network_error_display() {
        let error = LlmError::NetworkError("connection refused".to_string());
        assert_eq!(error.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(LlmError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_empty_response_display() {
        assert_eq!(
            LlmError::EmptyResponse.to_string(),
            "Response contained no choices"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: LlmError = json_err.into();
        assert!(matches!(err, LlmError::SerializationError(_)));
    }

    #[test]
    fn test_error_debug_contains_variant() {
        let error = LlmError::EmptyResponse;
        assert!(format!("{:?}", error).contains("EmptyResponse"));
    }
}
