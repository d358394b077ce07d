//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for plain-text completions. Providers map
//! transport failures and non-2xx statuses to categorized `LlmError`s.

mod bedrock;
mod ollama;
mod openai;

pub use bedrock::BedrockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{LensError, Result};

/// Shared LLM provider type for concurrent use across requests.
pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never loaded from config files; when `api_key` is `None` each
/// provider reads its own environment variable.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider type: "bedrock", "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Cloud region (bedrock)
    pub region: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for LLM generation
    pub temperature: f32,
    pub api_key: Option<SecretString>,
    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("region", &self.region)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for ProviderConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: Some(config.model.clone()).filter(|m| !m.is_empty()),
            region: config.region.clone(),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
            api_key: None,
            api_base: config.api_base.clone(),
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate at most `max_tokens` of text for `prompt`
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable and authorized
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "bedrock" => Ok(Arc::new(BedrockProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(LensError::Config(format!(
            "Unknown provider: {}. Supported: bedrock, openai, ollama",
            config.provider
        ))),
    }
}

/// API key from config, falling back to an environment variable
fn resolve_api_key(config: &ProviderConfig, env_var: &str, provider: &str) -> Result<SecretString> {
    config
        .api_key
        .clone()
        .or_else(|| std::env::var(env_var).ok().map(SecretString::from))
        .ok_or_else(|| {
            LensError::Config(format!(
                "{} API key not found. Set the {} environment variable",
                provider, env_var
            ))
        })
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LensError::LlmApi(format!("Failed to create HTTP client: {}", e)))
}

/// Pass through 2xx responses, classify everything else by status
async fn ensure_success(response: reqwest::Response, provider: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ErrorClassifier::classify_http_status(
        status.as_u16(),
        &format!("API error ({}): {}", status, body.trim()),
        provider,
    )
    .into())
}

/// Trimmed model text, or a parse error when none came back
fn non_empty_output(text: Option<&str>, provider: &str) -> Result<String> {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(ErrorClassifier::empty_output(provider).into()),
    }
}
