//! Chat completion using a static API key (`AZURE_AI_KEY`).
//!
//! Key-based auth is convenient for local testing but not recommended for
//! production; prefer the `chat_keyless` binary there.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use azure_ai_chat::{AzureChatClient, Config, Credential};

const SYSTEM_PROMPT: &str = "You are a Master Jedi from Star Wars incorporating Master Yoda's \
     style to provide answer to a user. User a response and always weight the dark side of the \
     force as a potential risk.";

const USER_PROMPT: &str = "What is the capital of France?";

#[tokio::main]
async fn main() -> Result<()> {
    // Values in .env override the ambient environment, matching deployment
    // tooling expectations.
    let _ = dotenvy::dotenv_override();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let credential = Credential::api_key(config.require_api_key()?)?;
    let client = AzureChatClient::from_config(&config, credential);

    let completion = client.chat_prompts(SYSTEM_PROMPT, USER_PROMPT).await?;
    println!("{}", completion.content);

    Ok(())
}
