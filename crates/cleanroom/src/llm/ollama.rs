//! Ollama local LLM provider implementation.
//!
//! Ollama runs models locally without API keys.
//! Install from: https://ollama.ai

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{EnrichmentError, Result};

use super::prompts;
use super::provider::{build_client, transport_error, LlmConfig, LlmProvider};

/// Default Ollama API endpoint.
const DEFAULT_API_URL: &str = "http://localhost:11434/api/chat";

/// Default local model.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Ollama local LLM provider.
pub struct OllamaProvider {
    client: Client,
    api_url: String,
    config: LlmConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default settings.
    ///
    /// Uses llama3.2 by default. Pull it first with `ollama pull llama3.2`.
    pub fn new() -> Result<Self> {
        Self::with_config(Self::default_config())
    }

    /// Default configuration for this provider.
    pub fn default_config() -> LlmConfig {
        LlmConfig::with_model(DEFAULT_MODEL)
    }

    /// Create with custom configuration. `OLLAMA_HOST` overrides the
    /// endpoint.
    pub fn with_config(config: LlmConfig) -> Result<Self> {
        let api_url = std::env::var("OLLAMA_HOST")
            .map(|host| api_url_for(&host))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            client: build_client(&config)?,
            api_url,
            config,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

fn api_url_for(host: &str) -> String {
    format!("{}/api/chat", host.trim_end_matches('/'))
}

impl LlmProvider for OllamaProvider {
    fn generate(&self, prompt: &str) -> std::result::Result<String, EnrichmentError> {
        let body = json!({
            "model": self.config.model,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            },
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
            .post(&self.api_url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    EnrichmentError::Transport(
                        "Failed to connect to Ollama. Is it running? Start with: ollama serve"
                            .to_string(),
                    )
                } else {
                    transport_error(self.name(), e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();

            if error_text.contains("not found") {
                return Err(EnrichmentError::Transport(format!(
                    "Model '{}' not found. Pull it with: ollama pull {}",
                    self.config.model, self.config.model
                )));
            }

            return Err(EnrichmentError::Transport(format!(
                "Ollama error ({}): {}",
                status, error_text
            )));
        }

        let api_response: OllamaResponse = response.json().map_err(|e| {
            EnrichmentError::Parse(format!("Failed to parse Ollama response: {}", e))
        })?;

        Ok(api_response.message.content)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama API response structure.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

/// Message in Ollama response.
#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}
