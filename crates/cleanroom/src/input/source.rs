//! Identity of an input file, recorded alongside a run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::dataset::Dataset;

/// What was read, and how it was split into fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    pub path: PathBuf,
    /// `sha256:<hex>` digest of the raw bytes.
    pub checksum: String,
    /// Field separator, detected or configured.
    pub delimiter: char,
    /// Header as read, in file order.
    pub columns: Vec<String>,
    /// Data rows, header excluded.
    pub row_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Describe `contents`, read from `path`, as parsed into `dataset`.
    pub fn describe(path: &Path, contents: &[u8], dataset: &Dataset) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path: path.to_path_buf(),
            checksum: format!("sha256:{:x}", Sha256::digest(contents)),
            delimiter: char::from(dataset.delimiter()),
            columns: dataset.columns().to_vec(),
            row_count: dataset.row_count(),
            loaded_at: Utc::now(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Name of the separator as written in messages.
    pub fn delimiter_name(&self) -> &'static str {
        match self.delimiter {
            ',' => "comma",
            '\t' => "tab",
            ';' => "semicolon",
            '|' => "pipe",
            _ => "custom",
        }
    }

    /// One line for the audit trail.
    pub fn summary(&self) -> String {
        format!(
            "Loaded {}: {} rows, {} columns, {}-delimited ({}).",
            self.file,
            self.row_count,
            self.column_count(),
            self.delimiter_name(),
            self.checksum
        )
    }
}
