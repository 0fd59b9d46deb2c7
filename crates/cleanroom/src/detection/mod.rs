//! Issue detection for customer records.
//!
//! Each rule inspects one column (or, for duplicates, whole records) and the
//! engine joins the resulting tags into the `issues` column.

mod engine;
mod issue;
pub mod rules;

pub use engine::{DetectionEngine, DetectionLog, RuleReport};
pub use issue::{join_tags, IssueTag};
pub use rules::{ColumnRule, DetectionRule, DuplicateRule};
