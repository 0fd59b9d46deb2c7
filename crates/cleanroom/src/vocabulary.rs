//! Canonical reference vocabularies.
//!
//! Vocabularies are injected configuration: the pipeline receives them
//! through [`crate::PipelineConfig`], and the built-in lists below are only
//! the defaults.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

const COUNTRIES: &[&str] = &[
    "United States", "India", "Canada", "United Kingdom", "Australia", "Germany", "France",
    "Japan", "China", "Brazil", "South Korea", "Italy", "Spain", "Mexico", "Russia",
    "Netherlands", "Sweden", "Norway", "Denmark", "Finland", "Switzerland", "Austria",
    "Belgium", "Ireland", "New Zealand", "Singapore", "Malaysia", "Thailand", "Indonesia",
    "Turkey", "Saudi Arabia", "UAE", "South Africa", "Egypt", "Argentina", "Chile",
    "Colombia", "Peru", "Poland", "Portugal", "Greece", "Czech Republic", "Hungary",
    "Romania", "Slovakia", "Slovenia", "Croatia", "Estonia", "Latvia", "Lithuania",
    "Philippines", "Vietnam", "Pakistan", "Bangladesh", "Sri Lanka", "Nepal", "Israel",
    "Qatar", "Kuwait", "Oman", "Morocco", "Kenya", "Nigeria", "Ghana", "Venezuela",
    "Ecuador", "Uruguay", "Paraguay", "Bolivia", "Costa Rica", "Panama", "Guatemala",
    "Honduras", "El Salvador", "Dominican Republic", "Cuba", "Jamaica",
    "Trinidad and Tobago", "Iceland", "Luxembourg", "Liechtenstein", "Monaco", "Andorra",
    "San Marino", "Malta", "Cyprus", "Bahrain", "Jordan", "Lebanon", "Syria", "Iraq", "Iran",
    "Afghanistan", "Uzbekistan", "Kazakhstan", "Azerbaijan", "Georgia", "Armenia",
    "Mongolia", "Cambodia", "Laos", "Myanmar", "Brunei", "Timor-Leste",
];

const CITIES: &[&str] = &[
    "Springfield", "Seattle", "Miami Beach", "San Francisco", "Bludhaven", "Hub City",
    "Metropolis", "Opal City", "Gateway City", "Houston", "Central City", "Bellevue",
    "Riverside", "New York", "Gotham", "Coast City", "Los Angeles", "Star City", "Miami",
    "National City", "Mumbai", "Newark", "Dallas", "Unknown",
];

const GENDERS: &[&str] = &["Male", "Female", "Other"];

const MARITAL_STATUSES: &[&str] = &["Single", "Married", "Divorced", "Widowed"];

/// A fixed, ordered set of accepted strings for one column.
///
/// Order matters: fuzzy-match ties resolve to the earliest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    entries: IndexSet<String>,
}

impl Vocabulary {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, value: &str) -> bool {
        self.entries.contains(value)
    }

    /// Entry equal to `value` ignoring ASCII case.
    pub fn find_ignore_case(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.eq_ignore_ascii_case(value))
            .map(|e| e.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The reference vocabularies consulted by detection and correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabularies {
    pub countries: Vocabulary,
    pub cities: Vocabulary,
    pub genders: Vocabulary,
    pub marital_statuses: Vocabulary,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            countries: Vocabulary::new(COUNTRIES.iter().copied()),
            cities: Vocabulary::new(CITIES.iter().copied()),
            genders: Vocabulary::new(GENDERS.iter().copied()),
            marital_statuses: Vocabulary::new(MARITAL_STATUSES.iter().copied()),
        }
    }
}
