//! Fuzz target for the tolerant parser applied to LLM responses.
//!
//! Arbitrary model output must yield either a table or an error.

#![no_main]

use cleanroom::enrichment::parse_table;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(parsed) = parse_table(text, b',') {
            let columns = parsed.dataset.column_count();
            assert!(parsed.dataset.rows().iter().all(|row| row.len() == columns));
        }
    }
});
