//! Tolerant parsing of tables returned by a text generator.
//!
//! Generated tables are untrusted: they may be wrapped in code fences,
//! carry commentary lines, or contain rows with stray delimiters. The parser
//! keeps every line whose field count equals the header's and drops the
//! rest. It fails only when no header or no data row survives.

use crate::dataset::{Cell, Dataset};
use crate::error::EnrichmentError;

/// Result of a tolerant parse.
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub dataset: Dataset,
    /// Non-empty lines discarded for a field-count mismatch.
    pub dropped_lines: usize,
}

/// Parse `text` as a header plus rows separated by `delimiter`.
pub fn parse_table(text: &str, delimiter: u8) -> Result<ParsedTable, EnrichmentError> {
    let mut lines = text
        .lines()
        .filter(|line| !is_fence(line))
        .filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| EnrichmentError::Parse("response contains no table".to_string()))?;
    let header: Vec<String> = split_line(header_line, delimiter)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let width = header.len();

    let mut rows = Vec::new();
    let mut dropped_lines = 0;
    for line in lines {
        let fields = split_line(line, delimiter);
        if fields.len() == width {
            rows.push(fields.iter().map(|f| Cell::parse(f)).collect());
        } else {
            dropped_lines += 1;
        }
    }

    if rows.is_empty() {
        return Err(EnrichmentError::Parse(format!(
            "no rows with {} fields in response ({} lines dropped)",
            width, dropped_lines
        )));
    }

    Ok(ParsedTable {
        dataset: Dataset::new(header, rows).with_delimiter(delimiter),
        dropped_lines,
    })
}

/// Code fence line such as "```" or "```csv".
fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Split one line into fields, honoring double quotes.
///
/// Malformed quoting never fails; whatever the CSV reader recovers is used.
fn split_line(line: &str, delimiter: u8) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => vec![line.to_string()],
    }
}
