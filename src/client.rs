//! Azure OpenAI chat-completions client.
//!
//! One authorized client issues one blocking round trip per call to the
//! versioned REST endpoint:
//!
//! ```text
//! {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={v}
//! ```
//!
//! The request body carries `messages[]` and `max_tokens`; the response body
//! carries `choices[0].message.content`. Both shapes are a fixed wire
//! contract owned by the service. No retry, no streaming, no conversation
//! state.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::auth::{Credential, COGNITIVE_SERVICES_SCOPE};
use crate::config::Config;
use crate::error::{LlmError, Result};
use crate::message::{ChatMessage, ChatOptions};

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatCompletionRequest {
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

/// One candidate completion.
#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Chat completion response body.
#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
}

/// Error envelope returned by Azure OpenAI on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
struct AzureErrorResponse {
    error: AzureError,
}

#[derive(Debug, Clone, Deserialize)]
struct AzureError {
    message: String,
}

/// The first completion of a chat response, flattened for callers.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    /// Text of `choices[0].message.content`.
    pub content: String,
    /// Model that produced the completion, when reported.
    pub model: Option<String>,
    /// Finish reason (e.g. "stop", "length"), when reported.
    pub finish_reason: Option<String>,
}

/// Client for one Azure OpenAI chat deployment.
#[derive(Debug, Clone)]
pub struct AzureChatClient {
    http: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    credential: Credential,
}

impl AzureChatClient {
    /// Create a client for a deployment.
    ///
    /// Construction performs no I/O: bearer credentials are consulted only
    /// when a request is actually sent.
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            deployment: deployment.into(),
            api_version: api_version.into(),
            credential,
        }
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config, credential: Credential) -> Self {
        Self::new(
            &config.endpoint,
            &config.deployment,
            &config.api_version,
            credential,
        )
    }

    /// Deployment name this client targets.
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Build the versioned chat-completions URL.
    fn build_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    /// Attach the configured credential to an outgoing request.
    ///
    /// The bearer path fetches a fresh token here, once per request.
    async fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.credential {
            Credential::ApiKey(key) => Ok(request.header("api-key", key)),
            Credential::Bearer(source) => {
                let token = source.get_token(COGNITIVE_SERVICES_SCOPE).await?;
                Ok(request.bearer_auth(token.token))
            }
        }
    }

    /// Issue a chat completion for an ordered message list.
    ///
    /// Returns [`LlmError::EmptyResponse`] when the service reports zero
    /// choices instead of indexing out of bounds.
    #[instrument(skip(self, messages, options), fields(deployment = %self.deployment))]
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatCompletion> {
        let request = ChatCompletionRequest {
            messages: messages.to_vec(),
            max_tokens: options.max_tokens,
        };

        let url = self.build_url();
        debug!("Sending chat request to {}", url);

        let builder = self.http.post(&url).header("Content-Type", "application/json");
        let response = self.authorize(builder).await?.json(&request).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<AzureErrorResponse>(&text) {
                return Err(LlmError::ApiError(format!(
                    "Azure OpenAI error: {}",
                    envelope.error.message
                )));
            }
            return Err(LlmError::ApiError(format!(
                "Azure OpenAI error ({}): {}",
                status, text
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;

        Ok(ChatCompletion {
            content: choice.message.content,
            model: parsed.model,
            finish_reason: choice.finish_reason,
        })
    }

    /// Issue the fixed system/user request: exactly two messages, system
    /// first, with the default token budget.
    pub async fn chat_prompts(&self, system: &str, user: &str) -> Result<ChatCompletion> {
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        self.chat(&messages, &ChatOptions::default()).await
    }
}
