//! Integration tests for the scriba CLI
//!
//! These tests run the binary end-to-end against files in a temp directory

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[allow(deprecated)]
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scriba").unwrap();
    cmd.current_dir(dir).arg("--no-color");
    cmd
}

/// `command` run against the fixture rule files
fn with_inputs(dir: &Path, command: &str, empirical: &str) -> Command {
    let mut cmd = cli(dir);
    cmd.arg(command)
        .args(["--official", "official.json"])
        .args(["--empirical", empirical]);
    cmd
}

fn create_inputs() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("official.json"),
        r#"{"rules": [
            {"description": "Always use active voice", "priority": "must"},
            {"description": "Margins are 2.5 cm", "category": "format"}
        ]}"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("empirical.json"),
        r#"[
            {"description": "Avoid active voice", "frequency": 0.9},
            {"description": "Keep sentences under 25 words", "frequency": 0.85},
            {"description": "Open paragraphs with a topic sentence", "frequency": 0.6}
        ]"#,
    )
    .unwrap();
    temp_dir
}

fn write_guide(dir: &Path) {
    with_inputs(dir, "integrate", "empirical.json")
        .args(["-o", "guide.json"])
        .assert()
        .success();
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("integrate"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_integrate_writes_guide() {
    let dir = create_inputs();
    with_inputs(dir.path(), "integrate", "empirical.json")
        .args(["-o", "guide.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("official=2 core=1 optional=1 suggested=0"));

    let guide = read_json(&dir.path().join("guide.json"));
    assert_eq!(guide["total_rules"], 4);
    assert_eq!(guide["tier_counts"]["official"], 2);
    assert_eq!(guide["resolution"]["dropped"][0]["id"], "empirical-rule-001");
    assert_eq!(guide["categories"]["FORMAT"][0], "official-rule-002");
}

#[test]
fn test_integrate_prints_json_without_output() {
    let dir = create_inputs();
    let output = with_inputs(dir.path(), "integrate", "empirical.json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let guide: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(guide["version"], "2.0");
}

#[test]
fn test_integrate_reports_skipped_records() {
    let dir = create_inputs();
    fs::write(
        dir.path().join("bad.json"),
        r#"[{"frequency": 0.5}, {"description": "Define acronyms", "frequency": 0.7}]"#,
    )
    .unwrap();
    with_inputs(dir.path(), "integrate", "bad.json")
        .args(["-o", "g.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("missing description"));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    with_inputs(dir.path(), "integrate", "nope.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_update_applies_delta() {
    let dir = create_inputs();
    write_guide(dir.path());
    fs::write(
        dir.path().join("delta.json"),
        r#"[{"description": "Define acronyms on first mention", "frequency": 0.95}]"#,
    )
    .unwrap();

    for _ in 0..2 {
        cli(dir.path())
            .args(["update", "--guide", "guide.json"])
            .args(["--empirical", "delta.json"])
            .assert()
            .success();
    }

    let guide = read_json(&dir.path().join("guide.json"));
    assert_eq!(guide["total_rules"], 5);
    assert_eq!(guide["tier_counts"]["core"], 2);
}

#[test]
fn test_rejected_update_leaves_guide_untouched() {
    let dir = create_inputs();
    write_guide(dir.path());
    let before = fs::read_to_string(dir.path().join("guide.json")).unwrap();
    fs::write(dir.path().join("delta.json"), r#"[{"frequency": 0.4}]"#).unwrap();

    cli(dir.path())
        .args(["update", "--guide", "guide.json"])
        .args(["--empirical", "delta.json", "-o", "new.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Update delta rejected"));

    let after = fs::read_to_string(dir.path().join("guide.json")).unwrap();
    assert_eq!(after, before);
    assert!(!dir.path().join("new.json").exists());
}

#[test]
fn test_conflicts_json() {
    let dir = create_inputs();
    let output = with_inputs(dir.path(), "conflicts", "empirical.json")
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let conflicts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(conflicts.as_array().unwrap().len(), 1);
    assert_eq!(conflicts[0]["kept"][0], "official-rule-001");
}

#[test]
fn test_inspect_filters() {
    let dir = create_inputs();
    write_guide(dir.path());

    let output = cli(dir.path())
        .args(["inspect", "guide.json", "--tier", "core", "--format", "json"])
        .output()
        .unwrap();
    let rules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["source_tier"], "CORE");

    cli(dir.path())
        .args(["inspect", "guide.json", "--category", "grammar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --category"));
}

#[test]
fn test_config_init_and_validate() {
    let dir = TempDir::new().unwrap();
    cli(dir.path()).args(["config", "init"]).assert().success();
    assert!(dir.path().join(".scribarc.json").exists());

    cli(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cli(dir.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = create_inputs();
    fs::write(
        dir.path().join(".scribarc.json"),
        r#"{"tiers": {"core": 0.3, "optional": 0.6}}"#,
    )
    .unwrap();
    with_inputs(dir.path(), "integrate", "empirical.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_config_schema() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coverageTarget"));
}
