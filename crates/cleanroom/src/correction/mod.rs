//! Rule-based correction of detected issues.

mod engine;
mod normalize;
mod operations;

pub use engine::CorrectionEngine;
pub use normalize::{median, normalize_name, normalize_phone, PHONE_SENTINEL};
pub use operations::{CorrectionChange, CorrectionLog, CorrectionStep};
