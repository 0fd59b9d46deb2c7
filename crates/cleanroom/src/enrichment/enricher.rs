//! Enrichment stage: fills missing values through an LLM provider.

use serde::Serialize;
use tracing::{debug, warn};

use crate::audit::{format_items, AuditLog, CellChange, FlaggedCell, Stage};
use crate::dataset::{Cell, Dataset, ISSUES_COLUMN};
use crate::error::EnrichmentError;
use crate::input::to_delimited_string;
use crate::llm::prompts::{enrichment_prompt, MISSING};
use crate::llm::LlmProvider;

use super::parser::parse_table;

/// How an enrichment attempt ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// The response replaced the dataset.
    Applied { provider: String },
    /// No provider was configured.
    Skipped,
    /// The dataset was left unchanged.
    Failed {
        provider: String,
        kind: String,
        message: String,
    },
}

/// Everything one enrichment attempt did.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentLog {
    pub outcome: EnrichmentOutcome,
    /// Missing cells that received a concrete value, per original column.
    pub filled: Vec<(String, Vec<CellChange>)>,
    /// Columns the response added, with every value.
    pub added: Vec<(String, Vec<FlaggedCell>)>,
    /// Response lines discarded by the tolerant parser.
    pub dropped_lines: usize,
}

impl EnrichmentLog {
    fn new(outcome: EnrichmentOutcome) -> Self {
        Self {
            outcome,
            filled: Vec::new(),
            added: Vec::new(),
            dropped_lines: 0,
        }
    }

    pub fn applied(&self) -> bool {
        matches!(self.outcome, EnrichmentOutcome::Applied { .. })
    }

    /// Number of cells filled across all columns.
    pub fn filled_count(&self) -> usize {
        self.filled.iter().map(|(_, changes)| changes.len()).sum()
    }

    pub fn record_to(&self, audit: &mut AuditLog) {
        match &self.outcome {
            EnrichmentOutcome::Skipped => {
                audit.warn(Stage::Enrichment, "No LLM provider configured; enrichment skipped.");
            }
            EnrichmentOutcome::Failed { provider, message, .. } => {
                audit.error(
                    Stage::Enrichment,
                    format!("{} {}. Dataset left unchanged.", provider, message),
                );
            }
            EnrichmentOutcome::Applied { provider } => {
                for (column, changes) in &self.filled {
                    audit.info(
                        Stage::Enrichment,
                        format!("Column: {} | {}", column, format_items(changes)),
                    );
                }
                for (column, values) in &self.added {
                    audit.info(
                        Stage::Enrichment,
                        format!("Column: {} | {}", column, format_items(values)),
                    );
                }
                if self.dropped_lines > 0 {
                    audit.warn(
                        Stage::Enrichment,
                        format!("Discarded {} malformed response lines.", self.dropped_lines),
                    );
                }
                audit.info(
                    Stage::Enrichment,
                    format!(
                        "Filled {} missing values and added {} columns using {}.",
                        self.filled_count(),
                        self.added.len(),
                        provider
                    ),
                );
            }
        }
    }
}

/// Sends a masked snapshot of the dataset to a provider and adopts the
/// returned table when it parses.
#[derive(Debug, Clone, Default)]
pub struct Enricher;

impl Enricher {
    pub fn new() -> Self {
        Self
    }

    /// Attempt enrichment. Never fails: provider and parse errors leave the
    /// dataset unchanged and are reported in the log.
    ///
    /// The issues column is dropped in every case.
    pub fn enrich(
        &self,
        mut dataset: Dataset,
        provider: Option<&dyn LlmProvider>,
    ) -> (Dataset, EnrichmentLog) {
        dataset.drop_column(ISSUES_COLUMN);

        let Some(provider) = provider else {
            debug!("enrichment skipped: no provider");
            return (dataset, EnrichmentLog::new(EnrichmentOutcome::Skipped));
        };

        match self.try_enrich(&dataset, provider) {
            Ok((enriched, log)) => (enriched, log),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "enrichment failed");
                let log = EnrichmentLog::new(EnrichmentOutcome::Failed {
                    provider: provider.name().to_string(),
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                });
                (dataset, log)
            }
        }
    }

    fn try_enrich(
        &self,
        dataset: &Dataset,
        provider: &dyn LlmProvider,
    ) -> Result<(Dataset, EnrichmentLog), EnrichmentError> {
        let table = to_delimited_string(&mask_missing(dataset), b',', true)
            .map_err(|e| EnrichmentError::Parse(format!("could not serialize dataset: {}", e)))?;
        let prompt = enrichment_prompt(&table);

        debug!(provider = provider.name(), bytes = prompt.len(), "sending enrichment prompt");
        let response = provider.generate(&prompt)?;

        let parsed = parse_table(&response, b',')?;
        let enriched = parsed.dataset.with_delimiter(dataset.delimiter());

        let missing: Vec<&str> = dataset
            .columns()
            .iter()
            .filter(|c| !enriched.has_column(c))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(EnrichmentError::Parse(format!(
                "response is missing columns: {}",
                missing.join(", ")
            )));
        }

        let mut log = EnrichmentLog::new(EnrichmentOutcome::Applied {
            provider: provider.name().to_string(),
        });
        log.dropped_lines = parsed.dropped_lines;
        log.filled = filled_cells(dataset, &enriched);
        log.added = added_columns(dataset, &enriched);

        Ok((enriched, log))
    }
}

/// Copy of `dataset` with every missing-like cell replaced by the placeholder.
fn mask_missing(dataset: &Dataset) -> Dataset {
    let rows = dataset
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if cell.is_missing_like() {
                        Cell::text(MISSING)
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        })
        .collect();
    Dataset::new(dataset.columns().to_vec(), rows)
}

/// Cells that were missing-like before and concrete after, per column.
fn filled_cells(before: &Dataset, after: &Dataset) -> Vec<(String, Vec<CellChange>)> {
    before
        .columns()
        .iter()
        .filter_map(|column| {
            let old = before.column_by_name(column)?;
            let new = after.column_by_name(column)?;
            let changes: Vec<CellChange> = old
                .iter()
                .zip(new.iter())
                .enumerate()
                .filter(|(_, (o, n))| o.is_missing_like() && !n.is_missing_like())
                .map(|(row, (o, n))| CellChange {
                    row,
                    old: (*o).clone(),
                    new: (*n).clone(),
                })
                .collect();
            (!changes.is_empty()).then(|| (column.clone(), changes))
        })
        .collect()
}

/// Columns present only in the enriched dataset.
fn added_columns(before: &Dataset, after: &Dataset) -> Vec<(String, Vec<FlaggedCell>)> {
    after
        .columns()
        .iter()
        .filter(|column| !before.has_column(column))
        .filter_map(|column| {
            let values = after.column_by_name(column)?;
            let flagged = values
                .into_iter()
                .enumerate()
                .map(|(row, value)| FlaggedCell {
                    row,
                    value: value.clone(),
                })
                .collect();
            Some((column.clone(), flagged))
        })
        .collect()
}
