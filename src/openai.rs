//! Client construction for OpenAI-compatible APIs (OpenAI, Groq, local servers).

use crate::config::LlmSettings;
use crate::error::{GlimtError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the default OpenAI endpoint (key from `OPENAI_API_KEY`).
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_config(
        OpenAIConfig::default(),
        Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    )
}

/// Create a client for the configured provider.
///
/// Returns `Ok(None)` when no API key is available, so callers can run without
/// a language model instead of failing.
pub fn create_provider_client(settings: &LlmSettings) -> Result<Option<Client<OpenAIConfig>>> {
    let Some(api_key) = settings.resolve_api_key() else {
        return Ok(None);
    };

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.clone())
        .with_api_key(api_key);

    create_client_with_config(config, Duration::from_secs(settings.timeout_seconds)).map(Some)
}

/// Create a client with a custom configuration and timeout.
pub fn create_client_with_config(
    config: OpenAIConfig,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GlimtError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
