//! Detection engine: runs the active rules and writes the issues column.

use serde::Serialize;
use tracing::debug;

use crate::audit::{format_items, AuditLog, FlaggedCell, Stage};
use crate::dataset::{Cell, Dataset, ISSUES_COLUMN};
use crate::vocabulary::Vocabularies;

use super::issue::{join_tags, IssueTag};
use super::rules::{
    age_rule, email_rule, empty_name_rule, loyalty_points_rule, membership_rule, phone_rule,
    DetectionRule, DuplicateRule,
};

/// Outcome of one rule over a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub tag: IssueTag,
    /// Inspected column, `None` for record-level rules.
    pub column: Option<String>,
    pub description: String,
    /// Indices of flagged rows.
    pub rows: Vec<usize>,
    /// Offending values, for column rules.
    pub flagged: Vec<FlaggedCell>,
}

impl RuleReport {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Audit line for this rule.
    pub fn message(&self) -> String {
        if self.rows.is_empty() {
            self.description.clone()
        } else if self.column.is_some() {
            format!("{} | {}", self.description, format_items(&self.flagged))
        } else {
            format!("{} | {}", self.description, format_items(&self.rows))
        }
    }
}

/// Everything one detection pass observed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionLog {
    pub reports: Vec<RuleReport>,
    pub total_rows: usize,
    /// Rows carrying at least one tag.
    pub flagged_rows: usize,
}

impl DetectionLog {
    pub fn has_issues(&self) -> bool {
        self.flagged_rows > 0
    }

    /// Rows tagged `Duplicate`.
    pub fn duplicate_rows(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.tag == IssueTag::Duplicate)
            .map(|r| r.count())
            .sum()
    }

    /// Number of rules that ran.
    pub fn rules_run(&self) -> usize {
        self.reports.len()
    }

    /// Append one entry per executed rule plus a summary line.
    pub fn record_to(&self, audit: &mut AuditLog) {
        for report in &self.reports {
            audit.info(Stage::Detection, report.message());
        }
        audit.info(
            Stage::Detection,
            format!(
                "Issues found in {} of {} rows ({} duplicates).",
                self.flagged_rows,
                self.total_rows,
                self.duplicate_rows()
            ),
        );
    }
}

/// Runs a fixed, ordered rule set against datasets.
pub struct DetectionEngine {
    rules: Vec<Box<dyn DetectionRule>>,
}

impl DetectionEngine {
    /// The standard customer-record rule set.
    ///
    /// Registration order is the order tags appear in the issues column.
    pub fn new(vocabularies: &Vocabularies) -> Self {
        let rules: Vec<Box<dyn DetectionRule>> = vec![
            Box::new(email_rule()),
            Box::new(phone_rule()),
            Box::new(membership_rule(
                "gender",
                IssueTag::InvalidGender,
                "invalid genders",
                vocabularies.genders.clone(),
            )),
            Box::new(membership_rule(
                "marital_status",
                IssueTag::InvalidMaritalStatus,
                "invalid marital statuses",
                vocabularies.marital_statuses.clone(),
            )),
            Box::new(age_rule()),
            Box::new(loyalty_points_rule()),
            Box::new(membership_rule(
                "country",
                IssueTag::NonCanonicalCountry,
                "non-canonical countries",
                vocabularies.countries.clone(),
            )),
            Box::new(DuplicateRule),
            Box::new(empty_name_rule("first_name")),
            Box::new(empty_name_rule("last_name")),
            Box::new(empty_name_rule("full_name")),
        ];
        Self { rules }
    }

    /// An engine with a custom rule set.
    pub fn with_rules(rules: Vec<Box<dyn DetectionRule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Box<dyn DetectionRule>] {
        &self.rules
    }

    /// Rules that apply to `dataset`: column rules whose column is present,
    /// and record-level rules when there is at least one data column.
    pub fn active_rules<'a>(&'a self, dataset: &Dataset) -> Vec<&'a dyn DetectionRule> {
        let has_data_columns = dataset.columns().iter().any(|c| c != ISSUES_COLUMN);
        self.rules
            .iter()
            .filter(|rule| match rule.column() {
                Some(column) => column != ISSUES_COLUMN && dataset.has_column(column),
                None => has_data_columns,
            })
            .map(|rule| rule.as_ref())
            .collect()
    }

    /// Tag every record and replace the issues column.
    ///
    /// Rows without tags get an empty string. With no active rules the
    /// dataset comes back without an issues column.
    pub fn detect(&self, mut dataset: Dataset) -> (Dataset, DetectionLog) {
        let active = self.active_rules(&dataset);
        let mut log = DetectionLog {
            total_rows: dataset.row_count(),
            ..DetectionLog::default()
        };

        if active.is_empty() {
            dataset.drop_column(ISSUES_COLUMN);
            debug!("no detection rules apply");
            return (dataset, log);
        }

        let mut tags: Vec<Vec<IssueTag>> = vec![Vec::new(); dataset.row_count()];
        for rule in active {
            let flags = rule.check(&dataset);
            let rows: Vec<usize> = flags
                .iter()
                .enumerate()
                .filter_map(|(i, flagged)| flagged.then_some(i))
                .collect();

            let flagged = match rule.column() {
                Some(column) => rows
                    .iter()
                    .map(|&row| FlaggedCell {
                        row,
                        value: dataset.get(row, column).cloned().unwrap_or(Cell::Null),
                    })
                    .collect(),
                None => Vec::new(),
            };

            for &row in &rows {
                tags[row].push(rule.tag());
            }

            debug!(tag = %rule.tag(), flagged = rows.len(), "detection rule ran");
            log.reports.push(RuleReport {
                tag: rule.tag(),
                column: rule.column().map(str::to_string),
                description: rule.describe(rows.len()),
                rows,
                flagged,
            });
        }

        log.flagged_rows = tags.iter().filter(|t| !t.is_empty()).count();
        let issues = tags.iter().map(|t| Cell::Text(join_tags(t))).collect();
        dataset.set_column(ISSUES_COLUMN, issues);

        (dataset, log)
    }
}
