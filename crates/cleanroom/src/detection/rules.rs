//! Detection rules.
//!
//! Column rules are keyed by the column they inspect; the engine leaves a
//! rule out of the active set when its column is absent. Record-level rules
//! (duplicates) have no column and run on every non-empty schema.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dataset::{Cell, Dataset, ISSUES_COLUMN};
use crate::vocabulary::Vocabulary;

use super::issue::IssueTag;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern is valid"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3,4}-\d{4}$").expect("phone pattern is valid"));

/// Upper bound of a plausible age.
pub const MAX_AGE: f64 = 120.0;

/// Trait for detection rules.
pub trait DetectionRule: Send + Sync {
    /// Column the rule inspects, `None` for record-level rules.
    fn column(&self) -> Option<&str>;

    /// Tag attached to flagged records.
    fn tag(&self) -> IssueTag;

    /// One flag per row, `true` when the row violates the rule.
    fn check(&self, dataset: &Dataset) -> Vec<bool>;

    /// Audit description for `count` flagged rows.
    fn describe(&self, count: usize) -> String;
}

type CellPredicate = Box<dyn Fn(&Cell) -> bool + Send + Sync>;

/// A rule that judges each cell of one column independently.
pub struct ColumnRule {
    column: String,
    tag: IssueTag,
    noun: String,
    is_invalid: CellPredicate,
}

impl ColumnRule {
    pub fn new<F>(column: impl Into<String>, tag: IssueTag, noun: impl Into<String>, is_invalid: F) -> Self
    where
        F: Fn(&Cell) -> bool + Send + Sync + 'static,
    {
        Self {
            column: column.into(),
            tag,
            noun: noun.into(),
            is_invalid: Box::new(is_invalid),
        }
    }
}

impl DetectionRule for ColumnRule {
    fn column(&self) -> Option<&str> {
        Some(&self.column)
    }

    fn tag(&self) -> IssueTag {
        self.tag.clone()
    }

    fn check(&self, dataset: &Dataset) -> Vec<bool> {
        match dataset.column_index(&self.column) {
            Some(index) => dataset
                .column_values(index)
                .map(|cell| (self.is_invalid)(cell))
                .collect(),
            None => vec![false; dataset.row_count()],
        }
    }

    fn describe(&self, count: usize) -> String {
        format!("{} {}", count, self.noun)
    }
}

/// Flags every record that has an identical twin elsewhere in the dataset.
///
/// Symmetric: both members of a pair are flagged. The issues column is left
/// out of the comparison.
pub struct DuplicateRule;

impl DetectionRule for DuplicateRule {
    fn column(&self) -> Option<&str> {
        None
    }

    fn tag(&self) -> IssueTag {
        IssueTag::Duplicate
    }

    fn check(&self, dataset: &Dataset) -> Vec<bool> {
        dataset.duplicate_mask(Some(ISSUES_COLUMN))
    }

    fn describe(&self, count: usize) -> String {
        format!("{} duplicate rows found.", count)
    }
}

pub fn is_valid_email(cell: &Cell) -> bool {
    match cell {
        Cell::Null => false,
        other => {
            let text = other.render();
            !text.trim().is_empty() && EMAIL_PATTERN.is_match(&text)
        }
    }
}

/// `DDD-DDDD` or `DDDD-DDDD`.
pub fn is_valid_phone(cell: &Cell) -> bool {
    PHONE_PATTERN.is_match(&cell.render())
}

/// Numeric and within `(0, 120]`.
pub fn is_plausible_age(cell: &Cell) -> bool {
    matches!(cell.as_number(), Some(age) if age > 0.0 && age <= MAX_AGE)
}

/// Numeric and non-negative.
pub fn is_valid_loyalty_points(cell: &Cell) -> bool {
    matches!(cell.as_number(), Some(points) if points >= 0.0)
}

/// Null, blank after trimming, or the literal `nan` in any case.
pub fn is_empty_name(cell: &Cell) -> bool {
    match cell {
        Cell::Null => true,
        Cell::Number(_) => false,
        Cell::Text(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
        }
    }
}

/// Text exactly equal to a vocabulary entry.
pub fn is_member(cell: &Cell, vocabulary: &Vocabulary) -> bool {
    cell.as_text().is_some_and(|s| vocabulary.contains(s))
}

pub fn email_rule() -> ColumnRule {
    ColumnRule::new("email", IssueTag::InvalidEmail, "missing or malformed emails", |c| {
        !is_valid_email(c)
    })
}

pub fn phone_rule() -> ColumnRule {
    ColumnRule::new("phone", IssueTag::InvalidPhone, "invalid phone numbers", |c| {
        !is_valid_phone(c)
    })
}

/// Flags values outside `vocabulary` (exact, case-sensitive).
pub fn membership_rule(
    column: &str,
    tag: IssueTag,
    noun: &str,
    vocabulary: Vocabulary,
) -> ColumnRule {
    ColumnRule::new(column, tag, noun, move |c| !is_member(c, &vocabulary))
}

pub fn age_rule() -> ColumnRule {
    ColumnRule::new(
        "age",
        IssueTag::InvalidAge,
        "missing, negative, or implausible ages",
        |c| !is_plausible_age(c),
    )
}

pub fn loyalty_points_rule() -> ColumnRule {
    ColumnRule::new(
        "loyalty_points",
        IssueTag::InvalidLoyaltyPoints,
        "invalid loyalty points",
        |c| !is_valid_loyalty_points(c),
    )
}

pub fn empty_name_rule(column: &str) -> ColumnRule {
    ColumnRule::new(
        column,
        IssueTag::EmptyName(column.to_string()),
        format!("empty {}", column),
        is_empty_name,
    )
}
