//! Value-level normalizations used by the correction engine.

use crate::dataset::{Cell, UNKNOWN};
use crate::detection::rules::is_empty_name;
use crate::matching::title_case;

/// Phone written when too few digits survive.
pub const PHONE_SENTINEL: &str = "0000-0000";

/// Digits in a local number without area code.
const LOCAL_PHONE_DIGITS: usize = 7;

/// Trim and title-case a name; empty names become `Unknown`.
pub fn normalize_name(cell: &Cell) -> Cell {
    if is_empty_name(cell) {
        return Cell::text(UNKNOWN);
    }
    match cell {
        Cell::Text(s) => Cell::Text(title_case(s.trim())),
        other => other.clone(),
    }
}

/// Reduce a phone value to its digits and format it as `DDDD-DDDD`.
///
/// Longer numbers keep their last eight digits and seven-digit local numbers
/// are left-padded with `0`. Anything shorter becomes [`PHONE_SENTINEL`]
/// rather than being padded, so a fragment such as `12-34` never turns into
/// a plausible-looking `0000-1234`.
pub fn normalize_phone(cell: &Cell) -> String {
    let digits: String = cell
        .render()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    let digits = match digits.len() {
        n if n >= 8 => digits[n - 8..].to_string(),
        LOCAL_PHONE_DIGITS => format!("0{}", digits),
        _ => return PHONE_SENTINEL.to_string(),
    };
    format!("{}-{}", &digits[..4], &digits[4..])
}

/// Median of `values`, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
