use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

#[allow(deprecated)]
fn kestrel_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("kestrel")
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("sample-report.json")
}

fn analyze_fixture(data_dir: &Path) {
    let mut cmd = Command::new(kestrel_bin());
    cmd.arg("analyze")
        .arg("example.com")
        .arg("--payload")
        .arg(fixture_path())
        .arg("--data-dir")
        .arg(data_dir);
    cmd.assert().success();
}

#[test]
fn test_export_fails_on_empty_history() {
    let data_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(kestrel_bin());
    cmd.arg("export")
        .arg("json")
        .arg("--data-dir")
        .arg(data_dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nothing to export"));
}

#[test]
fn test_export_json() {
    let data_dir = tempfile::tempdir().unwrap();
    analyze_fixture(data_dir.path());
    let output = data_dir.path().join("report.json");

    let mut cmd = Command::new(kestrel_bin());
    cmd.arg("export")
        .arg("json")
        .arg("--output")
        .arg(&output)
        .arg("--data-dir")
        .arg(data_dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Export written to"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"coreWebVitals\""));
    assert!(written.contains("\"performanceScores\""));
}

#[test]
fn test_export_csv_has_fixed_columns() {
    let data_dir = tempfile::tempdir().unwrap();
    analyze_fixture(data_dir.path());
    let output = data_dir.path().join("history.csv");

    let mut cmd = Command::new(kestrel_bin());
    cmd.arg("export")
        .arg("csv")
        .arg("--output")
        .arg(&output)
        .arg("--data-dir")
        .arg(data_dir.path());

    cmd.assert().success();

    let written = std::fs::read_to_string(&output).unwrap();
    let header = written.lines().next().unwrap();
    assert!(header.starts_with("\"Date\",\"Device\",\"Performance\""));
    assert_eq!(header.split("\",\"").count(), 12);
    assert_eq!(written.lines().count(), 2);
}

#[test]
fn test_export_pdf() {
    let data_dir = tempfile::tempdir().unwrap();
    analyze_fixture(data_dir.path());
    let output = data_dir.path().join("report.pdf");

    let mut cmd = Command::new(kestrel_bin());
    cmd.arg("export")
        .arg("pdf")
        .arg("--output")
        .arg(&output)
        .arg("--data-dir")
        .arg(data_dir.path());

    cmd.assert().success();

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
