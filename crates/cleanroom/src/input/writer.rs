//! Delimited output for cleaned datasets.

use std::path::Path;

use crate::dataset::Dataset;
use crate::error::{CleanroomError, Result};

/// Serialize a dataset to delimited text with a header row.
///
/// With `quote_all` every field is quoted; otherwise fields are quoted only
/// when necessary.
pub fn to_delimited_string(dataset: &Dataset, delimiter: u8, quote_all: bool) -> Result<String> {
    let style = if quote_all {
        csv::QuoteStyle::Always
    } else {
        csv::QuoteStyle::Necessary
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(style)
        .from_writer(Vec::new());

    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|c| c.render()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CleanroomError::Config(format!("Failed to flush output buffer: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| CleanroomError::Config(format!("Output is not valid UTF-8: {}", e)))
}

/// Write a dataset to `path` using its own delimiter.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so an existing output is never left half-written.
pub fn write_dataset(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| CleanroomError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let contents = to_delimited_string(dataset, dataset.delimiter(), false)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".partial");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents).map_err(io_err)?;
    std::fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}
