//! Credential resolution for Azure OpenAI.
//!
//! Two mutually exclusive authentication strategies are supported:
//!
//! - **API key**: a static secret attached verbatim as the `api-key` header.
//!   No refresh, no expiry handling; a stale key simply fails downstream.
//! - **Keyless (Entra ID)**: a short-lived bearer token requested on demand
//!   from a [`TokenCredential`]. Tokens are fetched lazily per request, never
//!   during client construction, and never cached by this crate.
//!
//! # Credential chain
//!
//! The keyless path resolves tokens through an ordered [`CredentialChain`]:
//! each source is tried in sequence and the first success wins. A source
//! whose configuration is absent is skipped; a configured source that fails
//! to authenticate surfaces its error in the final [`LlmError::AuthError`].
//!
//! Default chain order:
//! 1. [`ClientSecretCredential`] — OAuth2 client-credentials grant driven by
//!    `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`.
//! 2. [`ImdsCredential`] — Azure managed-identity metadata endpoint,
//!    available only when running inside Azure.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{LlmError, Result};

/// Token scope for the Azure Cognitive Services resource.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Entra ID authority used for the client-credentials grant.
const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Azure instance metadata service endpoint (managed identity).
const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254";

/// IMDS protocol version.
const IMDS_API_VERSION: &str = "2018-02-01";

/// A bearer token with its expiry timestamp (seconds since the Unix epoch).
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: u64,
}

impl AccessToken {
    /// Create a token expiring `expires_in` seconds from now.
    fn expiring_in(token: String, expires_in: u64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            token,
            expires_on: now + expires_in,
        }
    }
}

/// A source of bearer tokens for a given scope.
///
/// Implementations may perform network I/O on every call. The chat client
/// invokes [`TokenCredential::get_token`] once per outgoing request, so any
/// caching or refresh policy belongs to the implementation, not the caller.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in log and error messages.
    fn name(&self) -> &str;

    /// Whether this source has enough configuration to attempt a request.
    fn is_available(&self) -> bool {
        true
    }

    /// Request a token valid for `scope`.
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

// ============================================================================
// Client-credentials grant (service principal from environment)
// ============================================================================

/// Wire format of the Entra ID token endpoint response.
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Error envelope returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Service-principal credential using the OAuth2 client-credentials grant.
#[derive(Clone)]
pub struct ClientSecretCredential {
    http: reqwest::Client,
    authority: String,
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl ClientSecretCredential {
    /// Create a credential for an explicit service principal.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: Some(tenant_id.into()),
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
        }
    }

    /// Create a credential from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and
    /// `AZURE_CLIENT_SECRET`. Missing variables leave the source unavailable
    /// rather than failing, so the chain can move on.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            http: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: read("AZURE_TENANT_ID"),
            client_id: read("AZURE_CLIENT_ID"),
            client_secret: read("AZURE_CLIENT_SECRET"),
        }
    }

    /// Override the token authority (tests point this at a local server).
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    fn name(&self) -> &str {
        "client-secret"
    }

    fn is_available(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let (tenant, client, secret) = match (&self.tenant_id, &self.client_id, &self.client_secret)
        {
            (Some(t), Some(c), Some(s)) => (t, c, s),
            _ => {
                return Err(LlmError::AuthError(
                    "client-secret credential is not configured".to_string(),
                ))
            }
        };

        let url = format!("{}/{}/oauth2/v2.0/token", self.authority, tenant);
        debug!("Requesting token from {}", url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client.as_str()),
                ("client_secret", secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<OAuthErrorResponse>(&text) {
                return Err(LlmError::AuthError(format!(
                    "token request failed: {}: {}",
                    err.error,
                    err.error_description.unwrap_or_default()
                )));
            }
            return Err(LlmError::AuthError(format!(
                "token request failed ({}): {}",
                status, text
            )));
        }

        let parsed: OAuthTokenResponse = serde_json::from_str(&text)?;
        Ok(AccessToken::expiring_in(
            parsed.access_token,
            parsed.expires_in,
        ))
    }
}

// ============================================================================
// Managed identity (IMDS)
// ============================================================================

/// Wire format of the IMDS token response. Numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Managed-identity credential backed by the Azure instance metadata service.
#[derive(Clone)]
pub struct ImdsCredential {
    http: reqwest::Client,
    endpoint: String,
}

impl ImdsCredential {
    pub fn new() -> Self {
        // Short timeout: off-Azure hosts cannot reach the metadata address
        // and should fall through the chain quickly.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            http,
            endpoint: DEFAULT_IMDS_ENDPOINT.to_string(),
        }
    }

    /// Override the metadata endpoint (tests point this at a local server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for ImdsCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for ImdsCredential {
    fn name(&self) -> &str {
        "managed-identity"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        // IMDS takes a resource URI, not a scope.
        let resource = scope.trim_end_matches("/.default");
        let url = format!("{}/metadata/identity/oauth2/token", self.endpoint);
        debug!("Requesting managed-identity token from {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("api-version", IMDS_API_VERSION), ("resource", resource)])
            .header("Metadata", "true")
            .send()
            .await
            .map_err(|e| {
                LlmError::AuthError(format!("managed identity endpoint unreachable: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::AuthError(format!(
                "managed identity token request failed ({}): {}",
                status, text
            )));
        }

        let parsed: ImdsTokenResponse = serde_json::from_str(&text)?;
        let expires_in = parsed
            .expires_in
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        Ok(AccessToken::expiring_in(parsed.access_token, expires_in))
    }
}

// ============================================================================
// Credential chain
// ============================================================================

/// Ordered list of token sources tried in sequence, first success wins.
pub struct CredentialChain {
    sources: Vec<Arc<dyn TokenCredential>>,
}

impl CredentialChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// The ambient chain used by the keyless example: service principal from
    /// environment variables, then managed identity.
    pub fn default_chain() -> Self {
        Self::new()
            .with_source(Arc::new(ClientSecretCredential::from_env()))
            .with_source(Arc::new(ImdsCredential::new()))
    }

    /// Append a source to the end of the chain.
    pub fn with_source(mut self, source: Arc<dyn TokenCredential>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for CredentialChain {
    fn default() -> Self {
        Self::default_chain()
    }
}

#[async_trait]
impl TokenCredential for CredentialChain {
    fn name(&self) -> &str {
        "credential-chain"
    }

    fn is_available(&self) -> bool {
        self.sources.iter().any(|s| s.is_available())
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut attempts = Vec::new();

        for source in &self.sources {
            if !source.is_available() {
                debug!("Skipping credential source {}: not configured", source.name());
                attempts.push(format!("{}: not configured", source.name()));
                continue;
            }
            match source.get_token(scope).await {
                Ok(token) => {
                    debug!("Credential source {} produced a token", source.name());
                    return Ok(token);
                }
                Err(err) => {
                    debug!("Credential source {} failed: {}", source.name(), err);
                    attempts.push(format!("{}: {}", source.name(), err));
                }
            }
        }

        Err(LlmError::AuthError(format!(
            "no credential source produced a token [{}]",
            attempts.join("; ")
        )))
    }
}

// ============================================================================
// Auth mode
// ============================================================================

/// Authentication strategy for the chat client, selected once per process.
#[derive(Clone)]
pub enum Credential {
    /// Static API key sent as the `api-key` header.
    ApiKey(String),
    /// Bearer token fetched from `source` on every request.
    Bearer(Arc<dyn TokenCredential>),
}

impl Credential {
    /// Build a static-key credential, rejecting empty keys before any
    /// request is issued.
    pub fn api_key(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(LlmError::AuthError("API key is empty".to_string()));
        }
        Ok(Self::ApiKey(key))
    }

    /// Build a bearer-token credential from any token source.
    pub fn bearer(source: impl TokenCredential + 'static) -> Self {
        Self::Bearer(Arc::new(source))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("Credential::ApiKey(<redacted>)"),
            Self::Bearer(source) => write!(f, "Credential::Bearer({})", source.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Token source with a fixed outcome and a call counter.
    struct FakeSource {
        name: &'static str,
        available: bool,
        token: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn ok(name: &'static str, token: &'static str) -> Self {
            Self {
                name,
                available: true,
                token: Some(token),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                available: true,
                token: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn unavailable(name: &'static str) -> Self {
            Self {
                name,
                available: false,
                token: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenCredential for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.token {
                Some(token) => Ok(AccessToken::expiring_in(token.to_string(), 3600)),
                None => Err(LlmError::AuthError("deliberate failure".to_string())),
            }
        }
    }

    #[test]
    fn test_api_key_credential_non_empty() {
        let cred = Credential::api_key("my-key").unwrap();
        assert!(matches!(cred, Credential::ApiKey(ref k) if k == "my-key"));
    }

    #[test]
    fn test_api_key_credential_empty_rejected() {
        let err = Credential::api_key("").unwrap_err();
        assert!(matches!(err, LlmError::AuthError(_)));

        let err = Credential::api_key("   ").unwrap_err();
        assert!(matches!(err, LlmError::AuthError(_)));
    }

    #[test]
    fn test_credential_debug_redacts_key() {
        let cred = Credential::api_key("super-secret").unwrap();
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_access_token_expiry_in_future() {
        let token = AccessToken::expiring_in("t".to_string(), 3600);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert!(token.expires_on >= now + 3590);
    }

    #[tokio::test]
    async fn test_chain_first_success_wins() {
        let first = Arc::new(FakeSource::ok("first", "token-a"));
        let second = Arc::new(FakeSource::ok("second", "token-b"));
        let chain = CredentialChain::new()
            .with_source(first.clone())
            .with_source(second.clone());

        let token = chain.get_token(COGNITIVE_SERVICES_SCOPE).await.unwrap();
        assert_eq!(token.token, "token-a");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        // Later sources are never consulted once one succeeds.
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chain_skips_unavailable_sources() {
        let missing = Arc::new(FakeSource::unavailable("missing"));
        let working = Arc::new(FakeSource::ok("working", "token-c"));
        let chain = CredentialChain::new()
            .with_source(missing.clone())
            .with_source(working.clone());

        let token = chain.get_token(COGNITIVE_SERVICES_SCOPE).await.unwrap();
        assert_eq!(token.token, "token-c");
        assert_eq!(missing.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chain_falls_through_failures() {
        let broken = Arc::new(FakeSource::failing("broken"));
        let working = Arc::new(FakeSource::ok("working", "token-d"));
        let chain = CredentialChain::new()
            .with_source(broken.clone())
            .with_source(working.clone());

        let token = chain.get_token(COGNITIVE_SERVICES_SCOPE).await.unwrap();
        assert_eq!(token.token, "token-d");
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chain_all_fail_reports_each_source() {
        let chain = CredentialChain::new()
            .with_source(Arc::new(FakeSource::unavailable("missing")))
            .with_source(Arc::new(FakeSource::failing("broken")));

        let err = chain.get_token(COGNITIVE_SERVICES_SCOPE).await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, LlmError::AuthError(_)));
        assert!(message.contains("missing: not configured"));
        assert!(message.contains("broken"));
    }

    #[tokio::test]
    async fn test_empty_chain_is_auth_error() {
        let chain = CredentialChain::new();
        assert!(chain.is_empty());
        let err = chain.get_token(COGNITIVE_SERVICES_SCOPE).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthError(_)));
    }

    #[test]
    fn test_client_secret_availability() {
        let configured = ClientSecretCredential::new("tenant", "client", "secret");
        assert!(configured.is_available());

        let unconfigured = ClientSecretCredential {
            http: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: None,
            client_id: None,
            client_secret: None,
        };
        assert!(!unconfigured.is_available());
    }

    #[tokio::test]
    async fn test_unconfigured_client_secret_fails_without_io() {
        let credential = ClientSecretCredential {
            http: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: None,
            client_id: None,
            client_secret: None,
        };
        let err = credential
            .get_token(COGNITIVE_SERVICES_SCOPE)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::AuthError(_)));
    }

    #[test]
    fn test_imds_resource_conversion() {
        // The scope suffix "/.default" must not reach IMDS.
        let resource = COGNITIVE_SERVICES_SCOPE.trim_end_matches("/.default");
        assert_eq!(resource, "https://cognitiveservices.azure.com");
    }

    #[test]
    fn test_source_names() {
        assert_eq!(ClientSecretCredential::new("t", "c", "s").name(), "client-secret");
        assert_eq!(ImdsCredential::new().name(), "managed-identity");
        assert_eq!(CredentialChain::new().name(), "credential-chain");
    }
}
