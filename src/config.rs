//! Process configuration loaded from environment variables.
//!
//! The variable names are a wire contract with deployment tooling and must
//! not be renamed:
//! - `AZURE_AI_ENDPOINT`: base URL of the Azure OpenAI resource
//! - `AZURE_AI_ENDPOINT_VERSION`: REST API version string
//! - `AZURE_AI_CHAT_MODEL`: chat model deployment name
//! - `AZURE_AI_KEY`: static API key (only required for key-based auth)
//!
//! Configuration is resolved once at process start into an immutable
//! [`Config`] and passed to the components that need it; nothing in this
//! crate reads the environment after that point.

use crate::error::{LlmError, Result};

/// Base URL of the Azure OpenAI resource.
pub const ENV_ENDPOINT: &str = "AZURE_AI_ENDPOINT";
/// REST API version.
pub const ENV_API_VERSION: &str = "AZURE_AI_ENDPOINT_VERSION";
/// Chat model deployment name.
pub const ENV_CHAT_MODEL: &str = "AZURE_AI_CHAT_MODEL";
/// Static API key, only consumed by the key-based auth path.
pub const ENV_API_KEY: &str = "AZURE_AI_KEY";

/// Immutable configuration for one process invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint base URL, trailing slashes trimmed.
    pub endpoint: String,
    /// API version passed as the `api-version` query parameter.
    pub api_version: String,
    /// Deployment (model) name.
    pub deployment: String,
    /// Static API key, present only when `AZURE_AI_KEY` is set and non-empty.
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Fails with [`LlmError::ConfigError`] if any of the three always-required
    /// variables is missing or empty. The API key is optional here because the
    /// keyless path never reads it; key-based callers use
    /// [`Config::require_api_key`] to enforce its presence.
    pub fn from_env() -> Result<Self> {
        let endpoint = required_var(ENV_ENDPOINT)?;
        let api_version = required_var(ENV_API_VERSION)?;
        let deployment = required_var(ENV_CHAT_MODEL)?;

        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version,
            deployment,
            api_key,
        })
    }

    /// Get the static API key, failing fast when it was not configured.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LlmError::ConfigError(format!("{} not set", ENV_API_KEY)))
    }
}

/// Read a required environment variable, rejecting empty values.
fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(LlmError::ConfigError(format!("{} not set", name))),
    }
}
