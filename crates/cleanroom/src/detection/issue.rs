//! Issue tags attached to records by detection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One specific data-quality defect detected in a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    InvalidEmail,
    InvalidPhone,
    InvalidGender,
    InvalidMaritalStatus,
    InvalidAge,
    InvalidLoyaltyPoints,
    NonCanonicalCountry,
    Duplicate,
    /// A name column is null, blank, or the literal `nan`.
    EmptyName(String),
}

impl IssueTag {
    /// Text written to the issues column.
    pub fn label(&self) -> String {
        match self {
            IssueTag::InvalidEmail => "Invalid Email".to_string(),
            IssueTag::InvalidPhone => "Invalid Phone".to_string(),
            IssueTag::InvalidGender => "Invalid Gender".to_string(),
            IssueTag::InvalidMaritalStatus => "Invalid Marital Status".to_string(),
            IssueTag::InvalidAge => "Invalid Age".to_string(),
            IssueTag::InvalidLoyaltyPoints => "Invalid Loyalty Points".to_string(),
            IssueTag::NonCanonicalCountry => "Non-canonical Country".to_string(),
            IssueTag::Duplicate => "Duplicate".to_string(),
            IssueTag::EmptyName(column) => format!("Empty {}", column),
        }
    }
}

impl fmt::Display for IssueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Join tags the way the issues column stores them.
pub fn join_tags(tags: &[IssueTag]) -> String {
    tags.iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ")
}
