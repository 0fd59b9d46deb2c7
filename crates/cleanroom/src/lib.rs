//! Cleanroom: iterative cleaning of tabular customer records.
//!
//! A run repeats three stages until the data is clean or an iteration cap
//! is reached:
//!
//! - **Detection** tags every record with its data-quality issues
//! - **Correction** rewrites values toward canonical forms (fuzzy matching
//!   against reference vocabularies, median imputation, phone formatting,
//!   de-duplication)
//! - **Enrichment** asks an LLM provider to fill the values that are still
//!   missing and to derive two profile columns
//!
//! # Core Principles
//!
//! - **Bounded**: never more than `max_iterations` passes
//! - **Idempotent correction**: correcting corrected data changes nothing
//! - **Full audit trail**: every stage logs what it saw and what it changed
//!
//! # Example
//!
//! ```no_run
//! use cleanroom::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let outcome = pipeline.run_file("customers.csv", "customers_clean.csv").unwrap();
//!
//! println!("Status: {:?}", outcome.status);
//! println!("Iterations: {}", outcome.iterations);
//! outcome.write_log("cleaning.log").unwrap();
//! ```

pub mod audit;
pub mod config;
pub mod correction;
pub mod dataset;
pub mod detection;
pub mod enrichment;
pub mod error;
pub mod input;
pub mod llm;
pub mod matching;
pub mod vocabulary;

mod pipeline;

pub use crate::pipeline::{
    Pipeline, PipelineOutcome, RunFailure, RunResult, RunStatus, UnresolvedRow,
};
pub use audit::{AuditEntry, AuditLog, Stage};
pub use config::PipelineConfig;
pub use dataset::{Cell, Dataset};
pub use detection::{DetectionEngine, DetectionLog, IssueTag};
pub use error::{CleanroomError, EnrichmentError, Result};
pub use input::{Parser, SourceMetadata};
pub use llm::{
    AnthropicProvider, GeminiProvider, LlmConfig, LlmProvider, MockProvider, OllamaProvider,
    OpenAIProvider,
};
pub use matching::FuzzyMatcher;
pub use vocabulary::{Vocabularies, Vocabulary};
