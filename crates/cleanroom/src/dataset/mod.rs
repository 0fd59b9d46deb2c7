//! Dataset model: records of scalar cells addressed by row position.

mod cell;
mod table;

pub use cell::Cell;
pub use table::Dataset;

pub(crate) use cell::format_number;

/// Name of the derived column summarizing detected issues per record.
pub const ISSUES_COLUMN: &str = "issues";

/// Sentinel written by correction when no canonical value applies.
pub const UNKNOWN: &str = "Unknown";
