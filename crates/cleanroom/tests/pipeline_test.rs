//! End-to-end tests for the cleaning pipeline.

use std::io::Write;
use std::sync::Arc;

use tempfile::{tempdir, NamedTempFile};

use cleanroom::audit::Level;
use cleanroom::correction::CorrectionEngine;
use cleanroom::dataset::ISSUES_COLUMN;
use cleanroom::{
    Cell, Dataset, DetectionEngine, MockProvider, Pipeline, PipelineConfig, RunStatus, Stage,
    Vocabulary,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

const CUSTOMERS: &str = "\
first_name,last_name,email,phone,gender,marital_status,age,loyalty_points,country,city
john,doe,john@x.com,555-123-4567,Male,Married,34,1200,united sates,new york
Jane, ,jane@x,1234567,F,single,-5,-10,Germany,Gotham
Bob,Smith,bob@x.com,12-34,Male,Single,30,50,United States,Springfield
Bob,Smith,bob@x.com,12-34,Male,Single,30,50,United States,Springfield
";

fn text(value: &str) -> Cell {
    Cell::text(value)
}

// =============================================================================
// Full runs
// =============================================================================

#[test]
fn test_full_run_with_enrichment() {
    let provider = Arc::new(MockProvider::new());
    let file = create_test_file(CUSTOMERS);
    let dir = tempdir().unwrap();
    let output = dir.path().join("clean.csv");

    let outcome = Pipeline::new()
        .with_shared_llm(provider.clone())
        .run_file(file.path(), &output)
        .expect("Run failed");

    // Jane's email stays malformed, but nothing is missing after the
    // second correction.
    assert_eq!(outcome.status, RunStatus::Corrected);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.detection_runs, 2);
    assert_eq!(outcome.enrichments_applied, 1);
    assert_eq!(provider.calls(), 1);

    let ds = &outcome.dataset;
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.column_count(), 12);
    assert!(!ds.has_column(ISSUES_COLUMN));

    assert_eq!(ds.get(0, "first_name"), Some(&text("John")));
    assert_eq!(ds.get(0, "country"), Some(&text("United States")));
    assert_eq!(ds.get(0, "city"), Some(&text("New York")));
    assert_eq!(ds.get(0, "phone"), Some(&text("5123-4567")));
    assert_eq!(ds.get(0, "is_loyal_customer"), Some(&text("Yes")));

    assert_eq!(ds.get(1, "last_name"), Some(&text("Morgan")));
    assert_eq!(ds.get(1, "age"), Some(&Cell::Number(32.0)));
    assert_eq!(ds.get(1, "loyalty_points"), Some(&Cell::Number(0.0)));
    assert_eq!(ds.get(1, "gender"), Some(&text("Other")));
    assert_eq!(ds.get(1, "marital_status"), Some(&text("Single")));
    assert_eq!(ds.get(1, "phone"), Some(&text("0123-4567")));
    assert_eq!(ds.get(1, "is_loyal_customer"), Some(&text("No")));

    assert_eq!(ds.get(2, "phone"), Some(&text("0000-0000")));

    let written = std::fs::read_to_string(&output).unwrap();
    let header = written.lines().next().unwrap();
    assert!(header.ends_with("is_loyal_customer,customer_persona"));
    assert_eq!(written.lines().count(), 4);
}

#[test]
fn test_only_missing_cells_are_sent_as_placeholders() {
    let provider = Arc::new(MockProvider::new());
    let file = create_test_file(CUSTOMERS);
    let dir = tempdir().unwrap();

    Pipeline::new()
        .with_shared_llm(provider.clone())
        .run_file(file.path(), dir.path().join("clean.csv"))
        .unwrap();

    let prompts = provider.received();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].matches("\"MISSING\"").count(), 1);
    assert!(prompts[0].contains("\"Jane\",\"MISSING\""));
    assert!(!prompts[0].contains(ISSUES_COLUMN));
}

#[test]
fn test_audit_log_is_appended() {
    let file = create_test_file(CUSTOMERS);
    let dir = tempdir().unwrap();
    let log = dir.path().join("logs").join("cleaning.log");

    let pipeline = Pipeline::new().with_llm(MockProvider::new());
    let first = pipeline
        .run_file(file.path(), dir.path().join("a.csv"))
        .unwrap();
    first.write_log(&log).unwrap();
    let second = pipeline
        .run_file(file.path(), dir.path().join("b.csv"))
        .unwrap();
    second.write_log(&log).unwrap();

    let content = std::fs::read_to_string(&log).unwrap();
    assert_eq!(content.lines().count(), first.audit.len() + second.audit.len());
    for tag in ["[Detection]", "[Correction]", "[Enrichment]", "[Pipeline]"] {
        assert!(content.contains(tag), "missing {} entries", tag);
    }
    assert!(content.contains("Cleaned data written to"));
}

#[test]
fn test_unresolved_rows_keep_issues_column() {
    let file = create_test_file("email,city\nbad,\nalso bad,Gotham\n");
    let dir = tempdir().unwrap();
    let output = dir.path().join("clean.csv");
    let config = PipelineConfig {
        max_iterations: 2,
        ..PipelineConfig::default()
    };

    let outcome = Pipeline::with_config(config)
        .with_llm(MockProvider::failing("connection refused"))
        .run_file(file.path(), &output)
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Unresolved);
    assert!(!outcome.status.is_resolved());
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.detection_runs, 3);
    assert_eq!(outcome.unresolved.len(), 2);
    assert_eq!(outcome.unresolved[0].row, 0);
    assert_eq!(outcome.unresolved[0].issues, "Invalid Email");

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "email,city,issues\nbad,Unknown,Invalid Email\nalso bad,Gotham,Invalid Email\n"
    );

    let warnings: Vec<_> = outcome
        .audit
        .for_stage(Stage::Pipeline)
        .filter(|e| e.level == Level::Warning)
        .collect();
    assert_eq!(warnings.len(), 3);
    assert!(warnings[1].message.contains("Row 0 unresolved: Invalid Email"));
}

#[test]
fn test_missing_provider_is_logged_and_loop_continues() {
    let ds = Dataset::from_raw(&["email", "city"], &[vec!["bad", ""]]);
    let outcome = Pipeline::new().run(ds).unwrap();

    assert_eq!(outcome.status, RunStatus::Unresolved);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.enrichments_applied, 0);

    let skipped = outcome
        .audit
        .for_stage(Stage::Enrichment)
        .filter(|e| e.level == Level::Warning)
        .count();
    assert_eq!(skipped, 3);
}

#[test]
fn test_tab_delimited_output_keeps_delimiter() {
    let file = create_test_file("first_name\temail\nbob\tbob@x.com\nbob\tbob@x.com\n");
    let dir = tempdir().unwrap();
    let output = dir.path().join("clean.tsv");

    let outcome = Pipeline::new().run_file(file.path(), &output).unwrap();
    assert_eq!(outcome.status, RunStatus::Corrected);
    assert_eq!(outcome.source.as_ref().unwrap().delimiter, '\t');

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "first_name\temail\nBob\tbob@x.com\n");
}

#[test]
fn test_long_phone_digits_survive_loading() {
    let file = create_test_file("first_name,phone\nAnn,1234567890123456789\n");
    let dir = tempdir().unwrap();
    let output = dir.path().join("clean.csv");

    let outcome = Pipeline::new().run_file(file.path(), &output).unwrap();
    assert_eq!(outcome.status, RunStatus::Corrected);

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "first_name,phone\nAnn,2345-6789\n");
}

#[test]
fn test_fatal_error_leaves_existing_output_untouched() {
    let file = create_test_file("first_name,age\nann,-3\nbob,\n");
    let dir = tempdir().unwrap();
    let output = dir.path().join("clean.csv");
    std::fs::write(&output, "previous run\n").unwrap();

    let failure = Pipeline::new().run_file(file.path(), &output).unwrap_err();
    assert!(failure.to_string().contains("age"));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous run\n");
    assert!(failure.audit.for_stage(Stage::Detection).count() > 0);
}

#[test]
fn test_empty_input_is_rejected() {
    let file = create_test_file("");
    let dir = tempdir().unwrap();
    assert!(Pipeline::new()
        .run_file(file.path(), dir.path().join("clean.csv"))
        .is_err());
}

// =============================================================================
// Stage scenarios
// =============================================================================

#[test]
fn test_country_fuzzy_match_with_injected_vocabulary() {
    let mut config = PipelineConfig::default();
    config.vocabularies.countries = Vocabulary::new(["USA", "Canada"]);

    let ds = Dataset::from_raw(&["country"], &[vec!["U.S.A"], vec!["Kanada"], vec!["Atlantis"]]);
    let (corrected, log) = CorrectionEngine::new(&config).correct(ds).unwrap();

    assert_eq!(corrected.get(0, "country"), Some(&text("USA")));
    assert_eq!(corrected.get(1, "country"), Some(&text("Canada")));
    assert_eq!(corrected.get(2, "country"), Some(&text("Unknown")));
    assert_eq!(log.values_changed, 3);
}

#[test]
fn test_age_imputed_with_median() {
    let config = PipelineConfig::default();
    let ds = Dataset::from_raw(&["age"], &[vec!["-5"], vec!["30"], vec!["40"], vec!["50"]]);
    let (corrected, _) = CorrectionEngine::new(&config).correct(ds).unwrap();
    assert_eq!(corrected.get(0, "age"), Some(&Cell::Number(40.0)));
}

#[test]
fn test_identical_rows_tagged_and_collapsed() {
    let config = PipelineConfig::default();
    let ds = Dataset::from_raw(
        &["name", "email", "age"],
        &[vec!["Bob", "b@x.com", "30"], vec!["Bob", "b@x.com", "30"]],
    );

    let (annotated, log) = DetectionEngine::new(&config.vocabularies).detect(ds);
    assert_eq!(log.duplicate_rows(), 2);
    for row in 0..2 {
        assert_eq!(annotated.get(row, ISSUES_COLUMN), Some(&text("Duplicate")));
    }

    let (corrected, log) = CorrectionEngine::new(&config).correct(annotated).unwrap();
    assert_eq!(corrected.row_count(), 1);
    assert_eq!(log.rows_removed, 1);
    assert!(!corrected.has_column(ISSUES_COLUMN));
}

#[test]
fn test_short_phone_becomes_sentinel() {
    let config = PipelineConfig::default();
    let ds = Dataset::from_raw(&["phone"], &[vec!["12-34"]]);
    let (corrected, _) = CorrectionEngine::new(&config).correct(ds).unwrap();
    assert_eq!(corrected.get(0, "phone"), Some(&text("0000-0000")));
}

#[test]
fn test_unparseable_response_leaves_dataset_unchanged() {
    let response = "```csv\n\"first_name\",\"last_name\"\n\"Ann\"\n\"Lee\"\n```";
    let provider = Arc::new(MockProvider::scripted([response]));
    let config = PipelineConfig {
        max_iterations: 1,
        ..PipelineConfig::default()
    };
    let ds = Dataset::from_raw(&["first_name", "last_name"], &[vec!["ann", ""]]);

    let outcome = Pipeline::with_config(config)
        .with_shared_llm(provider.clone())
        .run(ds)
        .expect("enrichment failures must not abort the run");

    assert_eq!(provider.calls(), 1);
    assert_eq!(outcome.enrichments_applied, 0);
    assert_eq!(outcome.detection_runs, 2);
    // "Unknown" is not an empty name, so the final detection passes.
    assert_eq!(outcome.status, RunStatus::Resolved);
    assert_eq!(outcome.dataset.get(0, "last_name"), Some(&text("Unknown")));

    let errors: Vec<_> = outcome
        .audit
        .for_stage(Stage::Enrichment)
        .filter(|e| e.level == Level::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("parse error"));
    assert!(errors[0].message.contains("Dataset left unchanged"));
}
