//! Append-only audit trail for a pipeline run.
//!
//! Every stage reports what it looked at and what it changed. Entries are
//! only ever appended; the pipeline never reads them back to make decisions.
//! Each entry is also emitted as a `tracing` event so a subscriber sees the
//! run as it happens.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::Cell;
use crate::error::{CleanroomError, Result};

/// A cell rewritten by a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    pub row: usize,
    pub old: Cell,
    pub new: Cell,
}

impl fmt::Display for CellChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.row, self.old, self.new)
    }
}

/// A cell observed by a stage without being changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedCell {
    pub row: usize,
    pub value: Cell,
}

impl fmt::Display for FlaggedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.value)
    }
}

/// Pipeline stage that produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pipeline,
    Detection,
    Correction,
    Enrichment,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Pipeline => "Pipeline",
            Stage::Detection => "Detection",
            Stage::Correction => "Correction",
            Stage::Enrichment => "Enrichment",
        }
    }
}

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// One timestamped line of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub stage: Stage,
    pub level: Level,
    pub message: String,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} — {} — [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level.label(),
            self.stage.label(),
            self.message
        )
    }
}

/// Append-only collection of audit entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and emit it as a tracing event.
    pub fn record(&mut self, stage: Stage, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Info => tracing::info!(stage = stage.label(), "{}", message),
            Level::Warning => tracing::warn!(stage = stage.label(), "{}", message),
            Level::Error => tracing::error!(stage = stage.label(), "{}", message),
        }
        self.entries.push(AuditEntry {
            timestamp: Utc::now(),
            stage,
            level,
            message,
        });
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, Level::Info, message);
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, Level::Warning, message);
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, Level::Error, message);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries produced by one stage.
    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(move |e| e.stage == stage)
    }

    /// Append every entry as a text line to `path`, creating parent
    /// directories and the file when missing.
    pub fn append_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| CleanroomError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        for entry in &self.entries {
            writeln!(file, "{}", entry).map_err(io_err)?;
        }
        Ok(())
    }
}

/// Render a list of audit items the way entries embed them.
pub(crate) fn format_items<T: fmt::Display>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_and_filter() {
        let mut log = AuditLog::new();
        log.info(Stage::Detection, "2 invalid phone numbers");
        log.warn(Stage::Pipeline, "Row 3: Invalid Email");

        assert_eq!(log.len(), 2);
        assert_eq!(log.for_stage(Stage::Detection).count(), 1);
        assert_eq!(log.entries()[1].level, Level::Warning);
    }

    #[test]
    fn test_entry_format() {
        let mut log = AuditLog::new();
        log.info(Stage::Correction, "Standardized gender");
        let line = log.entries()[0].to_string();

        assert!(line.contains("— INFO — [Correction] Standardized gender"));
    }

    #[test]
    fn test_append_to_file_is_append_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("audit.txt");

        let mut first = AuditLog::new();
        first.info(Stage::Pipeline, "first run");
        first.append_to_file(&path).unwrap();

        let mut second = AuditLog::new();
        second.info(Stage::Pipeline, "second run");
        second.append_to_file(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first run"));
        assert!(lines[1].ends_with("second run"));
    }

    #[test]
    fn test_format_items() {
        let changes = vec![CellChange {
            row: 0,
            old: Cell::text("usa"),
            new: Cell::text("United States"),
        }];
        assert_eq!(format_items(&changes), "[(0, 'usa', 'United States')]");
    }
}
