//! Anthropic Claude API provider implementation.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{CleanroomError, EnrichmentError, Result};

use super::prompts;
use super::provider::{build_client, check_status, transport_error, LlmConfig, LlmProvider};

/// Anthropic API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version.
const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    headers: HeaderMap,
    config: LlmConfig,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, Self::default_config())
    }

    /// Default configuration for this provider.
    pub fn default_config() -> LlmConfig {
        LlmConfig::default()
    }

    /// Create a new Anthropic provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            headers: build_headers(&api_key.into())?,
            config,
        })
    }

    /// Create from environment variable.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            CleanroomError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Self::with_config(api_key, config)
    }
}

/// Build headers for API requests.
fn build_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        "x-api-key",
        HeaderValue::from_str(api_key)
            .map_err(|e| CleanroomError::Config(format!("Invalid API key: {}", e)))?,
    );
    headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

impl LlmProvider for AnthropicProvider {
    fn generate(&self, prompt: &str) -> std::result::Result<String, EnrichmentError> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": prompts::system_prompt(),
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(API_URL)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .map_err(|e| transport_error(self.name(), e))?;
        let response = check_status(self.name(), response)?;

        let api_response: ApiResponse = response.json().map_err(|e| {
            EnrichmentError::Parse(format!("Failed to parse API response: {}", e))
        })?;

        extract_text(api_response)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// First text block of a response.
fn extract_text(response: ApiResponse) -> std::result::Result<String, EnrichmentError> {
    response
        .content
        .into_iter()
        .find(|block| block.content_type == "text")
        .map(|block| block.text)
        .ok_or_else(|| EnrichmentError::Parse("No text in API response".to_string()))
}

/// Anthropic API response structure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

/// Content block in API response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_skips_other_blocks() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"content": [{"type": "thinking"}, {"type": "text", "text": "\"a\"\n\"1\""}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "\"a\"\n\"1\"");
    }

    #[test]
    fn test_extract_text_without_text_block() {
        let response: ApiResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(extract_text(response), Err(EnrichmentError::Parse(_))));
    }

    #[test]
    fn test_invalid_api_key_header() {
        assert!(AnthropicProvider::new("bad\nkey").is_err());
    }
}
