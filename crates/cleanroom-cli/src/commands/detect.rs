//! Detect command - report issues without correcting them.

use std::path::PathBuf;

use cleanroom::input::write_dataset;
use cleanroom::{Parser, Pipeline};
use colored::Colorize;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new();
    let parser = Parser::with_config(pipeline.config().parser.clone());
    let (dataset, source) = parser.parse_file(&file)?;
    let (annotated, log) = pipeline.detect(dataset);

    if let Some(path) = &output {
        write_dataset(&annotated, path)?;
    }

    if json_output {
        let report = serde_json::json!({
            "file": source.file,
            "rows": log.total_rows,
            "flagged_rows": log.flagged_rows,
            "reports": log.reports,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Checked".cyan().bold(),
        file.display(),
        source.row_count,
        source.column_count()
    );
    println!();

    if !log.has_issues() {
        println!("{}", "No issues found".green().bold());
        return Ok(());
    }

    for report in log.reports.iter().filter(|r| r.count() > 0) {
        println!(
            "  {:<24} {}",
            report.tag.label().yellow(),
            report.description
        );
        if verbose {
            let rows: Vec<String> = report.rows.iter().map(|r| r.to_string()).collect();
            println!("    rows: {}", rows.join(", ").dimmed());
        }
    }

    println!();
    println!(
        "{} {} of {} rows flagged",
        "Summary:".bold(),
        log.flagged_rows,
        log.total_rows
    );
    if let Some(path) = output {
        println!("{} {}", "Annotated data:".green().bold(), path.display());
    }
    Ok(())
}
