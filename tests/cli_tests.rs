//! CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("agentest").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn run_requires_goal() {
    let mut cmd = Command::cargo_bin("agentest").unwrap();
    cmd.args(["run", "--model", "gpt_4", "--step", "Open app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--goal"));
}

#[test]
fn run_with_invalid_model_fails_before_network() {
    let mut cmd = Command::cargo_bin("agentest").unwrap();
    cmd.args([
        "run",
        "--model",
        "claude",
        "--goal",
        "Login flow",
        "--step",
        "Open app",
        // Unroutable endpoint: validation must fail without touching it.
        "--endpoint",
        "http://127.0.0.1:1",
    ])
    .assert()
    .failure()
    .stdout(predicate::str::contains("Invalid model selected"));
}

#[test]
fn run_with_no_steps_reports_validation_error() {
    let mut cmd = Command::cargo_bin("agentest").unwrap();
    cmd.args([
        "run",
        "--model",
        "gpt_4",
        "--goal",
        "Login flow",
        "--endpoint",
        "http://127.0.0.1:1",
    ])
    .assert()
    .failure()
    .stdout(predicate::str::contains("Please add at least one test step"));
}
