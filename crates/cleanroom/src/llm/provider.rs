//! LLM provider trait and configuration.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{CleanroomError, EnrichmentError, Result};

/// Default request timeout. Whole-table completions are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for LLM providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,

    /// Maximum tokens in response. The reply carries the whole table.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Request timeout. Expiry is reported as a transport failure.
    pub timeout: Duration,
}

impl LlmConfig {
    /// Default configuration with a different model.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 8192,
            temperature: 0.3,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations must be thread-safe (Send + Sync) so a pipeline holding
/// one can be shared. A call is a single blocking request with no retry.
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` and return the completion text.
    fn generate(&self, prompt: &str) -> std::result::Result<String, EnrichmentError>;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}

/// Blocking HTTP client honoring the configured timeout.
pub(crate) fn build_client(config: &LlmConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| CleanroomError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Map a request error, calling out timeouts.
pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> EnrichmentError {
    if e.is_timeout() {
        EnrichmentError::Transport(format!("{} request timed out", provider))
    } else {
        EnrichmentError::Transport(format!("{} request failed: {}", provider, e))
    }
}

/// Turn a non-success response into a transport error.
pub(crate) fn check_status(
    provider: &str,
    response: reqwest::blocking::Response,
) -> std::result::Result<reqwest::blocking::Response, EnrichmentError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().unwrap_or_default();
    Err(EnrichmentError::Transport(format!(
        "{} API error ({}): {}",
        provider, status, error_text
    )))
}
