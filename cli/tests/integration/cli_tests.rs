//! Integration tests for the command surface and argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn discoveryctl() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("discoveryctl"));
    cmd.env("NO_COLOR", "1")
        .env_remove("DISCOVERY_CONFIG")
        .env_remove("DISCOVERY_FORCE")
        .env_remove("CI");
    cmd
}

#[test]
fn test_no_args_shows_help_and_exits_two() {
    discoveryctl()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_lists_all_subcommands() {
    discoveryctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scheduled"))
        .stdout(predicate::str::contains("current"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_help_warns_about_overlapping_runs() {
    discoveryctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("must not overlap"));
}

#[test]
fn test_version_flag_shows_binary_name() {
    discoveryctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("discoveryctl"));
}

#[test]
fn test_current_without_network_view_is_usage_error() {
    discoveryctl()
        .arg("current")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--network_view"));
}

#[test]
fn test_current_help_documents_force_and_view() {
    discoveryctl()
        .args(["current", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--network_view"))
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_status_rejects_unknown_task_kind() {
    discoveryctl()
        .args(["status", "weekly"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    discoveryctl().arg("rediscover").assert().code(2);
}
