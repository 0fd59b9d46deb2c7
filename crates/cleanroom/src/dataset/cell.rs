//! Scalar cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw tokens that load as an absent value.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Integer literals longer than this do not survive a round trip through
/// `f64`.
const MAX_EXACT_INTEGER_DIGITS: usize = 15;

/// Text values that count as missing for enrichment purposes (lower-cased).
const MISSING_LIKE: &[&str] = &["", "missing", "unknown", "nan"];

/// A single value in a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Absent value.
    Null,
    /// Numeric value (always finite).
    Number(f64),
    /// Any other value, stored as read.
    Text(String),
}

impl Cell {
    /// Interpret a raw delimited field.
    ///
    /// NA-like tokens become [`Cell::Null`], numeric literals become
    /// [`Cell::Number`]. Literals with a leading zero (`0123`) and integers
    /// too long to hold exactly stay text so phone-like values keep their
    /// digits.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NA_TOKENS.contains(&trimmed) {
            return Cell::Null;
        }
        if is_numeric_literal(trimmed) && !is_long_integer(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Cell::Number(n);
                }
            }
        }
        Cell::Text(raw.to_string())
    }

    /// Build a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Whether the cell is absent.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value, if the cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if the cell holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Null, blank, or a sentinel such as `Unknown`, `NaN` or `MISSING`
    /// (case-insensitive).
    pub fn is_missing_like(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(_) => false,
            Cell::Text(s) => {
                let lowered = s.trim().to_lowercase();
                MISSING_LIKE.contains(&lowered.as_str())
            }
        }
    }

    /// Render the cell as it is written to a delimited file.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Key used for whole-record identity comparisons.
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Cell::Null => "\u{0}".to_string(),
            // -0.0 and 0.0 compare equal, so they must share a key
            Cell::Number(n) => format!("n:{}", (n + 0.0).to_bits()),
            Cell::Text(s) => format!("t:{}", s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NaN"),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

/// Format a number without a trailing `.0` when it is integral.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Digits with an optional sign, decimal point and exponent, without a
/// significant leading zero.
fn is_numeric_literal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut chars = unsigned.chars();
    match (chars.next(), chars.next()) {
        (Some(first), _) if !first.is_ascii_digit() && first != '.' => false,
        (Some('0'), Some(second)) if second.is_ascii_digit() => false,
        (Some(_), _) => unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')),
        (None, _) => false,
    }
}

fn is_long_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    digits.len() > MAX_EXACT_INTEGER_DIGITS && digits.chars().all(|c| c.is_ascii_digit())
}
