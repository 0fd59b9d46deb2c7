//! OpenAI GPT API provider implementation.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{CleanroomError, EnrichmentError, Result};

use super::prompts;
use super::provider::{build_client, check_status, transport_error, LlmConfig, LlmProvider};

/// OpenAI API endpoint.
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default OpenAI model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI GPT provider.
pub struct OpenAIProvider {
    client: Client,
    headers: HeaderMap,
    config: LlmConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, Self::default_config())
    }

    /// Default configuration for this provider.
    pub fn default_config() -> LlmConfig {
        LlmConfig::with_model(DEFAULT_MODEL)
    }

    /// Create a new OpenAI provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key.into()))
                .map_err(|e| CleanroomError::Config(format!("Invalid API key: {}", e)))?,
        );

        Ok(Self {
            client: build_client(&config)?,
            headers,
            config,
        })
    }

    /// Create from environment variable.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            CleanroomError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::with_config(api_key, config)
    }
}

impl LlmProvider for OpenAIProvider {
    fn generate(&self, prompt: &str) -> std::result::Result<String, EnrichmentError> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {
                    "role": "system",
                    "content": prompts::system_prompt()
                },
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

        let api_response: OpenAIResponse = response.json().map_err(|e| {
            EnrichmentError::Parse(format!("Failed to parse API response: {}", e))
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EnrichmentError::Parse("No response from OpenAI".to_string()))
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// OpenAI API response structure.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

/// Choice in OpenAI response.
#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Message in OpenAI response.
#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model() {
        let provider = OpenAIProvider::new("test-key").unwrap();
        assert_eq!(provider.config().model, DEFAULT_MODEL);
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_response_shape() {
        let parsed: OpenAIResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "\"a\""}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content, "\"a\"");
    }
}
