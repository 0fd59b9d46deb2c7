//! Google Gemini API provider implementation.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{CleanroomError, EnrichmentError, Result};

use super::prompts;
use super::provider::{build_client, check_status, transport_error, LlmConfig, LlmProvider};

/// Gemini API base URL; the model and method are appended.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variables checked for an API key, in order.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_GEMINI_API_KEY"];

/// Google Gemini provider.
pub struct GeminiProvider {
    client: Client,
    headers: HeaderMap,
    config: LlmConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, Self::default_config())
    }

    /// Default configuration for this provider.
    pub fn default_config() -> LlmConfig {
        LlmConfig::with_model(DEFAULT_MODEL)
    }

    /// Create a new Gemini provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key.into())
                .map_err(|e| CleanroomError::Config(format!("Invalid API key: {}", e)))?,
        );

        Ok(Self {
            client: build_client(&config)?,
            headers,
            config,
        })
    }

    /// Create from `GEMINI_API_KEY` or `GOOGLE_GEMINI_API_KEY`.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .ok_or_else(|| {
                CleanroomError::Config(
                    "GEMINI_API_KEY or GOOGLE_GEMINI_API_KEY environment variable not set"
                        .to_string(),
                )
            })?;
        Self::with_config(api_key, config)
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.config.model)
    }
}

impl LlmProvider for GeminiProvider {
    fn generate(&self, prompt: &str) -> std::result::Result<String, EnrichmentError> {
        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": prompts::system_prompt() }]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens
            }
        });

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .map_err(|e| transport_error(self.name(), e))?;
        let response = check_status(self.name(), response)?;

        let api_response: GeminiResponse = response.json().map_err(|e| {
            EnrichmentError::Parse(format!("Failed to parse Gemini response: {}", e))
        })?;

        extract_text(api_response)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: GeminiResponse) -> std::result::Result<String, EnrichmentError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EnrichmentError::Parse("No candidates in Gemini response".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(EnrichmentError::Parse("Empty Gemini response".to_string()));
    }
    Ok(text.trim().to_string())
}

/// Gemini API response structure.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}
