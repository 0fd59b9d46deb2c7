//! Correction engine that rewrites flagged values toward canonical forms.

use tracing::debug;

use crate::audit::CellChange;
use crate::config::{FallbackValues, PipelineConfig};
use crate::dataset::{Cell, Dataset, ISSUES_COLUMN};
use crate::detection::rules::{is_member, is_plausible_age, is_valid_loyalty_points};
use crate::error::{CleanroomError, Result};
use crate::matching::FuzzyMatcher;
use crate::vocabulary::{Vocabularies, Vocabulary};

use super::normalize::{median, normalize_name, normalize_phone};
use super::operations::{CorrectionChange, CorrectionLog, CorrectionStep};

const NAME_COLUMNS: [&str; 3] = ["first_name", "last_name", "full_name"];

/// Engine for applying the fixed sequence of correction steps.
///
/// Every step is conditional on its column being present. Applying the
/// engine to its own output changes nothing.
pub struct CorrectionEngine {
    vocabularies: Vocabularies,
    fallbacks: FallbackValues,
    country_matcher: FuzzyMatcher,
    city_matcher: FuzzyMatcher,
}

impl CorrectionEngine {
    /// Create a correction engine from pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            vocabularies: config.vocabularies.clone(),
            fallbacks: config.fallbacks.clone(),
            country_matcher: FuzzyMatcher::new(config.matching.country_threshold),
            city_matcher: FuzzyMatcher::new(config.matching.city_threshold),
        }
    }

    /// Apply every step in order.
    ///
    /// Fails only when ages need imputing and no plausible age exists to
    /// take a median from.
    pub fn correct(&self, mut dataset: Dataset) -> Result<(Dataset, CorrectionLog)> {
        let mut log = CorrectionLog::new();

        for column in NAME_COLUMNS {
            let changes = dataset.map_column(column, normalize_name);
            log.add_change(CorrectionChange::values(
                CorrectionStep::NormalizeNames,
                column,
                changes,
            ));
        }

        let removed = dataset.dedup_rows(Some(ISSUES_COLUMN));
        log.add_change(CorrectionChange::removal(
            CorrectionStep::RemoveDuplicates,
            removed,
        ));

        let changes = canonicalize(
            &mut dataset,
            "country",
            &self.country_matcher,
            &self.vocabularies.countries,
        );
        log.add_change(CorrectionChange::values(
            CorrectionStep::CanonicalizeCountry,
            "country",
            changes,
        ));

        let changes = impute_age(&mut dataset)?;
        log.add_change(CorrectionChange::values(
            CorrectionStep::ImputeAge,
            "age",
            changes,
        ));

        let changes = dataset.map_column("loyalty_points", |cell| {
            if is_valid_loyalty_points(cell) {
                cell.clone()
            } else {
                Cell::Number(0.0)
            }
        });
        log.add_change(CorrectionChange::values(
            CorrectionStep::RepairLoyaltyPoints,
            "loyalty_points",
            changes,
        ));

        let changes = fallback(
            &mut dataset,
            "gender",
            &self.vocabularies.genders,
            &self.fallbacks.gender,
        );
        log.add_change(CorrectionChange::values(
            CorrectionStep::FallbackGender,
            "gender",
            changes,
        ));

        let changes = fallback(
            &mut dataset,
            "marital_status",
            &self.vocabularies.marital_statuses,
            &self.fallbacks.marital_status,
        );
        log.add_change(CorrectionChange::values(
            CorrectionStep::FallbackMaritalStatus,
            "marital_status",
            changes,
        ));

        let changes = dataset.map_column("phone", |cell| Cell::Text(normalize_phone(cell)));
        log.add_change(CorrectionChange::values(
            CorrectionStep::FormatPhone,
            "phone",
            changes,
        ));

        let changes = canonicalize(
            &mut dataset,
            "city",
            &self.city_matcher,
            &self.vocabularies.cities,
        );
        log.add_change(CorrectionChange::values(
            CorrectionStep::CanonicalizeCity,
            "city",
            changes,
        ));

        let removed = dataset.dedup_rows(Some(ISSUES_COLUMN));
        log.add_change(CorrectionChange::removal(
            CorrectionStep::RemoveNewDuplicates,
            removed,
        ));

        if dataset.drop_column(ISSUES_COLUMN) {
            log.add_change(CorrectionChange::removal(CorrectionStep::DropIssues, Vec::new()));
        }

        debug!(
            values_changed = log.values_changed,
            rows_removed = log.rows_removed,
            "correction finished"
        );
        Ok((dataset, log))
    }
}

/// Resolve every non-canonical value of `column` through the matcher.
fn canonicalize(
    dataset: &mut Dataset,
    column: &str,
    matcher: &FuzzyMatcher,
    vocabulary: &Vocabulary,
) -> Vec<CellChange> {
    dataset.map_column(column, |cell| {
        if is_member(cell, vocabulary) {
            return cell.clone();
        }
        let candidate = if cell.is_null() {
            String::new()
        } else {
            cell.render()
        };
        Cell::Text(matcher.resolve(&candidate, vocabulary))
    })
}

/// Replace every value outside `vocabulary` with `replacement`.
fn fallback(
    dataset: &mut Dataset,
    column: &str,
    vocabulary: &Vocabulary,
    replacement: &str,
) -> Vec<CellChange> {
    dataset.map_column(column, |cell| {
        if is_member(cell, vocabulary) {
            cell.clone()
        } else {
            Cell::text(replacement)
        }
    })
}

/// Replace implausible ages with the median of the plausible ones.
fn impute_age(dataset: &mut Dataset) -> Result<Vec<CellChange>> {
    let Some(ages) = dataset.column_by_name("age") else {
        return Ok(Vec::new());
    };

    let plausible: Vec<f64> = ages
        .iter()
        .filter(|cell| is_plausible_age(cell))
        .filter_map(|cell| cell.as_number())
        .collect();
    if plausible.len() == ages.len() {
        return Ok(Vec::new());
    }

    let median = median(&plausible).ok_or_else(|| CleanroomError::CorrectionUndefined {
        column: "age".to_string(),
        reason: "no plausible ages to take a median from".to_string(),
    })?;

    Ok(dataset.map_column("age", |cell| {
        if is_plausible_age(cell) {
            cell.clone()
        } else {
            Cell::Number(median)
        }
    }))
}
