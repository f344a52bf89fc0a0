//! Chat completion using keyless (Entra ID) authentication.
//!
//! No API key is read. A bearer token is requested per call from the default
//! credential chain: service principal configured via `AZURE_TENANT_ID` /
//! `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`, then Azure managed identity.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use azure_ai_chat::{AzureChatClient, Config, Credential, CredentialChain};

const SYSTEM_PROMPT: &str = "You are a Master Jedi from Star Wars incorporating Master Yoda's \
     style to provide answer to a user. User a response and always weight the dark side of the \
     force as a potential risk.";

const USER_PROMPT: &str = "What is the capital of France?";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv_override();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let credential = Credential::bearer(CredentialChain::default_chain());
    let client = AzureChatClient::from_config(&config, credential);

    let completion = client.chat_prompts(SYSTEM_PROMPT, USER_PROMPT).await?;
    println!("{}", completion.content);

    Ok(())
}
