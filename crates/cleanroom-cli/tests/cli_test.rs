//! Command-line tests for the `cleanroom` binary.

use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const CUSTOMERS: &str = "\
first_name,last_name,email,phone,gender,marital_status,age,loyalty_points,country,city
john,doe,john@x.com,555-123-4567,Male,Married,34,1200,united sates,new york
Jane, ,jane@x,1234567,F,single,-5,-10,Germany,Gotham
";

fn cleanroom() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cleanroom"));
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_GEMINI_API_KEY");
    cmd
}

fn write_input(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("customers.csv");
    std::fs::write(&path, content).unwrap();
    path
}

fn run_args<'a>(input: &'a Path, output: &'a Path, log: &'a Path) -> Vec<&'a std::ffi::OsStr> {
    vec![
        "run".as_ref(),
        "-i".as_ref(),
        input.as_os_str(),
        "-o".as_ref(),
        output.as_os_str(),
        "-l".as_ref(),
        log.as_os_str(),
    ]
}

#[test]
fn test_run_with_mock_provider() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CUSTOMERS);
    let output = dir.path().join("clean.csv");
    let log = dir.path().join("cleaning.log");

    cleanroom()
        .args(run_args(&input, &output, &log))
        .args(["--llm", "mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned data:"))
        .stdout(predicate::str::contains(output.display().to_string()));

    let cleaned = std::fs::read_to_string(&output).unwrap();
    assert!(cleaned.lines().next().unwrap().ends_with("customer_persona"));

    let audit = std::fs::read_to_string(&log).unwrap();
    assert!(audit.contains("[Detection]"));
    assert!(audit.contains("[Enrichment]"));
}

#[test]
fn test_run_json_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "first_name,email\nbob,bob@x.com\n");
    let output = dir.path().join("clean.csv");
    let log = dir.path().join("cleaning.log");

    let assert = cleanroom()
        .args(run_args(&input, &output, &log))
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["outcome"]["status"], "clean");
    assert_eq!(summary["outcome"]["iterations"], 1);
}

#[test]
fn test_unresolved_run_exits_zero_with_warning() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "email,city\nbad,\n");
    let output = dir.path().join("clean.csv");
    let log = dir.path().join("cleaning.log");

    cleanroom()
        .args(run_args(&input, &output, &log))
        .args(["--max-iterations", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issues remain"))
        .stdout(predicate::str::contains("row 0: Invalid Email"));

    let audit = std::fs::read_to_string(&log).unwrap();
    assert!(audit.contains("Row 0 unresolved: Invalid Email"));
}

#[test]
fn test_fatal_run_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "first_name,age\nann,-3\n");
    let output = dir.path().join("clean.csv");
    let log = dir.path().join("cleaning.log");

    cleanroom()
        .args(run_args(&input, &output, &log))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    assert!(!output.exists());
    let audit = std::fs::read_to_string(&log).unwrap();
    assert!(audit.contains("Run failed"));
}

#[test]
fn test_fatal_run_keeps_stage_entries() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "first_name,age\nann,-3\nbob,\n");
    let output = dir.path().join("clean.csv");
    let log = dir.path().join("cleaning.log");

    cleanroom()
        .args(run_args(&input, &output, &log))
        .assert()
        .failure();

    let audit = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = audit.lines().collect();
    assert!(lines.iter().any(|l| l.contains("[Detection]")));
    assert!(lines.iter().any(|l| l.contains("[Pipeline] Starting run")));
    let last = lines.last().unwrap();
    assert!(last.contains("ERROR — [Pipeline] Run failed: Correction undefined for column 'age'"));
}

#[test]
fn test_missing_api_key_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CUSTOMERS);
    let output = dir.path().join("clean.csv");
    let log = dir.path().join("cleaning.log");

    cleanroom()
        .args(run_args(&input, &output, &log))
        .args(["--llm", "gemini"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_unknown_provider_is_rejected() {
    cleanroom()
        .args(["run", "-i", "in.csv", "-o", "out.csv", "--llm", "bard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown provider"));
}

#[test]
fn test_detect_reports_issues() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CUSTOMERS);

    cleanroom()
        .arg("detect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid Email"))
        .stdout(predicate::str::contains("2 of 2 rows flagged"));
}

#[test]
fn test_detect_json_and_annotated_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CUSTOMERS);
    let annotated = dir.path().join("annotated.csv");

    let assert = cleanroom()
        .arg("detect")
        .arg(&input)
        .arg("-o")
        .arg(&annotated)
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["rows"], 2);
    assert_eq!(report["flagged_rows"], 2);

    let written = std::fs::read_to_string(&annotated).unwrap();
    assert!(written.lines().next().unwrap().ends_with(",issues"));
}
