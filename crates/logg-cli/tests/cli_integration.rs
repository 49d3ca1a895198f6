//! CLI integration tests for the logg binary
//!
//! Run with: cargo test -p logg-cli --test cli_integration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli_cmd() -> Command {
    Command::cargo_bin("logg").unwrap()
}

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("log_config.ini");
    fs::write(&path, body).unwrap();
    path
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    cli_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("emit"))
        .stdout(predicate::str::contains("burst"))
        .stdout(predicate::str::contains("check"));
}

// ============================================================================
// Emit
// ============================================================================

#[test]
fn test_emit_to_console_by_default() {
    cli_cmd()
        .args(["emit", "--level", "warn", "disk", "almost", "full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[W] disk almost full"));
}

#[test]
fn test_emit_rejects_unknown_level() {
    cli_cmd()
        .args(["emit", "--level", "loud", "hello"])
        .assert()
        .failure();
}

#[test]
fn test_emit_through_file_config() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("out.log");
    let config = write_config(
        &dir,
        &format!(
            "logg.root.level = info\n\
             logg.appender.stdout = file\n\
             logg.appender.stdout.file = {}\n",
            log.display()
        ),
    );

    cli_cmd()
        .arg("--config")
        .arg(&config)
        .args(["emit", "--level", "error", "boom"])
        .assert()
        .success();

    cli_cmd()
        .arg("--config")
        .arg(&config)
        .args(["emit", "--level", "debug", "filtered"])
        .assert()
        .success();

    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("[E] boom"));
    assert!(!content.contains("filtered"));
}

#[test]
fn test_emit_with_caller() {
    cli_cmd()
        .args(["emit", "--caller", "traced"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[I][main.rs:"))
        .stdout(predicate::str::contains("] traced"));
}

#[test]
fn test_missing_config_fails() {
    cli_cmd()
        .args(["--config", "/nonexistent/logg.ini", "emit", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading"));
}

// ============================================================================
// Burst
// ============================================================================

#[test]
fn test_async_burst_writes_every_message() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("burst.log");
    let config = write_config(
        &dir,
        &format!(
            "logg.appender.stdout = file\nlogg.appender.stdout.file = {}\n",
            log.display()
        ),
    );

    cli_cmd()
        .arg("--config")
        .arg(&config)
        .args(["burst", "--count", "300", "--async", "--queue", "4"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 300 messages"));

    let content = fs::read_to_string(&log).unwrap();
    assert_eq!(content.lines().count(), 300);
    assert!(content.contains("[I] burst message 0"));
    assert!(content.contains("[I] burst message 299"));
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_prints_appenders() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "logg.root.level = warn\n\
         logg.appender.stdout = console\n\
         logg.appender = errors\n\
         logg.appender.errors = file\n\
         logg.appender.errors.file = errors.log\n",
    );

    cli_cmd()
        .arg("check")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: warn"))
        .stdout(predicate::str::contains("stdout (console) {}"))
        .stdout(predicate::str::contains("errors (file)"))
        .stdout(predicate::str::contains("errors.log"));
}

#[test]
fn test_check_reports_bad_line() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "logg.root.level = info\nnot a pair\n");

    cli_cmd()
        .arg("check")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}
