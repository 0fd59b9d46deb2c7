//! LLM provider integration for the enrichment stage.
//!
//! Enrichment is optional: a pipeline without a provider skips it and
//! relies on detection and correction alone.
//!
//! # Supported Providers
//!
//! - **Gemini** - Google models via API (requires `GEMINI_API_KEY` or
//!   `GOOGLE_GEMINI_API_KEY`)
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Ollama** - Local models, no API key needed (requires Ollama installed)
//! - **Mock** - Deterministic responses for tests and dry runs
//!
//! # Example
//!
//! ```no_run
//! use cleanroom::{GeminiProvider, LlmConfig, Pipeline};
//!
//! let pipeline = Pipeline::new()
//!     .with_llm(GeminiProvider::from_env(LlmConfig::with_model("gemini-2.5-flash")).unwrap());
//! ```

mod anthropic;
mod gemini;
mod mock;
mod ollama;
mod openai;
pub mod prompts;
mod provider;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider::{LlmConfig, LlmProvider, DEFAULT_TIMEOUT};
