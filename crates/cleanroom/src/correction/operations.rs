//! Correction steps and the log of what they changed.

use serde::{Deserialize, Serialize};

use crate::audit::{format_items, AuditLog, CellChange, Stage};

/// A correction step, in the order the engine applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStep {
    NormalizeNames,
    RemoveDuplicates,
    CanonicalizeCountry,
    ImputeAge,
    RepairLoyaltyPoints,
    FallbackGender,
    FallbackMaritalStatus,
    FormatPhone,
    CanonicalizeCity,
    /// Duplicates created by the value rewrites above.
    RemoveNewDuplicates,
    DropIssues,
}

impl CorrectionStep {
    /// Get a human-readable description of the step.
    pub fn description(&self) -> &'static str {
        match self {
            CorrectionStep::NormalizeNames => "Normalized names",
            CorrectionStep::RemoveDuplicates => "Removed duplicate rows",
            CorrectionStep::CanonicalizeCountry => "Standardized country",
            CorrectionStep::ImputeAge => "Imputed ages with median",
            CorrectionStep::RepairLoyaltyPoints => "Reset loyalty points",
            CorrectionStep::FallbackGender => "Replaced invalid genders",
            CorrectionStep::FallbackMaritalStatus => "Replaced invalid marital statuses",
            CorrectionStep::FormatPhone => "Standardized phone",
            CorrectionStep::CanonicalizeCity => "Standardized city",
            CorrectionStep::RemoveNewDuplicates => "Removed rows duplicated by correction",
            CorrectionStep::DropIssues => "Dropped issues column",
        }
    }
}

/// Changes made by one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionChange {
    pub step: CorrectionStep,

    /// Column affected, if the step rewrites values.
    pub column: Option<String>,

    /// Rewritten cells.
    pub changes: Vec<CellChange>,

    /// Indices of removed rows, as numbered when the step ran.
    pub removed_rows: Vec<usize>,
}

impl CorrectionChange {
    pub fn values(step: CorrectionStep, column: &str, changes: Vec<CellChange>) -> Self {
        Self {
            step,
            column: Some(column.to_string()),
            changes,
            removed_rows: Vec::new(),
        }
    }

    pub fn removal(step: CorrectionStep, removed_rows: Vec<usize>) -> Self {
        Self {
            step,
            column: None,
            changes: Vec::new(),
            removed_rows,
        }
    }

    /// Audit line for this change.
    pub fn message(&self) -> String {
        match (&self.column, self.removed_rows.is_empty()) {
            (Some(column), _) if !self.changes.is_empty() => format!(
                "{} '{}' | {}",
                self.step.description(),
                column,
                format_items(&self.changes)
            ),
            (_, false) => format!(
                "{} | {}",
                self.step.description(),
                format_items(&self.removed_rows)
            ),
            _ => self.step.description().to_string(),
        }
    }
}

/// Everything one correction pass changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionLog {
    pub changes: Vec<CorrectionChange>,

    /// Number of cells rewritten.
    pub values_changed: usize,

    /// Number of rows removed.
    pub rows_removed: usize,
}

impl CorrectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change. Changes that touched nothing are not kept.
    pub fn add_change(&mut self, change: CorrectionChange) {
        if change.changes.is_empty()
            && change.removed_rows.is_empty()
            && change.step != CorrectionStep::DropIssues
        {
            return;
        }
        self.values_changed += change.changes.len();
        self.rows_removed += change.removed_rows.len();
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes made by `step`.
    pub fn for_step(&self, step: CorrectionStep) -> impl Iterator<Item = &CorrectionChange> {
        self.changes.iter().filter(move |c| c.step == step)
    }

    pub fn record_to(&self, audit: &mut AuditLog) {
        for change in &self.changes {
            audit.info(Stage::Correction, change.message());
        }
        audit.info(
            Stage::Correction,
            format!(
                "{} values changed, {} rows removed.",
                self.values_changed, self.rows_removed
            ),
        );
    }
}
