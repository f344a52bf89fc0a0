//! Azure OpenAI chat-completions client with two authentication strategies.
//!
//! This crate covers the minimal flow behind a single chat request:
//! resolve configuration from the environment, pick an auth mode, obtain a
//! usable credential, assemble a system/user message pair, and issue one
//! blocking round trip.
//!
//! # Authentication
//!
//! | Mode | Mechanism | Use |
//! |------|-----------|-----|
//! | API key | static `api-key` header | local testing |
//! | Keyless | Entra ID bearer token via [`CredentialChain`] | recommended for production |
//!
//! The keyless path fetches tokens lazily, once per outgoing request, from an
//! ordered chain of [`TokenCredential`] sources (service principal from the
//! environment, then managed identity).
//!
//! # Example
//!
//! ```ignore
//! use azure_ai_chat::{AzureChatClient, Config, Credential};
//!
//! let config = Config::from_env()?;
//! let credential = Credential::api_key(config.require_api_key()?)?;
//! let client = AzureChatClient::from_config(&config, credential);
//! let completion = client.chat_prompts("You are helpful.", "Hello!").await?;
//! println!("{}", completion.content);
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod message;

pub use auth::{
    AccessToken, ClientSecretCredential, Credential, CredentialChain, ImdsCredential,
    TokenCredential, COGNITIVE_SERVICES_SCOPE,
};
pub use client::{AzureChatClient, ChatCompletion};
pub use config::Config;
pub use error::{LlmError, Result};
pub use message::{ChatMessage, ChatOptions, ChatRole, DEFAULT_MAX_TOKENS};
