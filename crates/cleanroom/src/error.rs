//! Error types for the Cleanroom library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Cleanroom operations.
///
/// Every variant is fatal to a pipeline run. Failures of the enrichment
/// collaborator are reported through [`EnrichmentError`] instead and never
/// reach the orchestrator.
#[derive(Debug, Error)]
pub enum CleanroomError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing CSV/TSV data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A correction rule has no valid basis to compute its replacement.
    #[error("Correction undefined for column '{column}': {reason}")]
    CorrectionUndefined { column: String, reason: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Cleanroom operations.
pub type Result<T> = std::result::Result<T, CleanroomError>;

/// Failure of the external text generator or of its response.
///
/// The enrichment stage recovers from these locally: the dataset is left
/// unchanged and the failure is written to the audit log.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The request could not be sent, timed out, or returned an error status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response did not contain a usable table.
    #[error("parse error: {0}")]
    Parse(String),
}

impl EnrichmentError {
    /// Short label used in audit entries.
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichmentError::Transport(_) => "transport",
            EnrichmentError::Parse(_) => "parse",
        }
    }
}
