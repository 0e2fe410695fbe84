//! End-to-end tests driving the breakdetect binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn breakdetect(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_breakdetect"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run breakdetect")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_init_writes_default_manifest() {
    let dir = TempDir::new().unwrap();

    let output = breakdetect(dir.path(), &["init"]);
    assert!(output.status.success());

    let written = fs::read_to_string(dir.path().join("breakdetect.toml")).unwrap();
    assert!(written.contains("[simulation]"));
    assert_eq!(written.matches("[[parts]]").count(), 5);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("breakdetect.toml"), "# keep me\n").unwrap();

    let output = breakdetect(dir.path(), &["init"]);
    assert!(!output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("breakdetect.toml")).unwrap(),
        "# keep me\n"
    );

    let output = breakdetect(dir.path(), &["init", "--force"]);
    assert!(output.status.success());
}

#[test]
fn test_run_then_analyze() {
    let dir = TempDir::new().unwrap();
    assert!(breakdetect(dir.path(), &["init"]).status.success());

    let output = breakdetect(
        dir.path(),
        &["run", "-n", "40", "--seed", "3", "-o", "results.csv"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("40 trials"));

    let results = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    assert!(results.contains("# 40 simulations of 45 cycles"));

    let output = breakdetect(dir.path(), &["analyze", "results.csv", "--details"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Collisions:"));
}

#[test]
fn test_seeded_runs_match_across_modes() {
    let dir = TempDir::new().unwrap();

    let sequential = breakdetect(
        dir.path(),
        &["run", "-n", "200", "--seed", "11", "-o", "sequential.csv"],
    );
    let pooled = breakdetect(
        dir.path(),
        &["run", "-n", "200", "--seed", "11", "-m", "-j", "3", "-o", "pooled.csv"],
    );
    assert!(sequential.status.success());
    assert!(pooled.status.success());

    assert_eq!(
        fs::read_to_string(dir.path().join("sequential.csv")).unwrap(),
        fs::read_to_string(dir.path().join("pooled.csv")).unwrap()
    );
}

#[test]
fn test_analyze_missing_results_fails() {
    let dir = TempDir::new().unwrap();
    let output = breakdetect(dir.path(), &["analyze", "nowhere.csv"]);
    assert!(!output.status.success());
}
