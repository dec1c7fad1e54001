//! CLI integration tests for facedex-cli.
//!
//! These tests run the actual binary and check outputs and exit codes.
//! None of them require a reachable server; network-facing commands are
//! pointed at a closed port and asserted to fail with the network code.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the facedex binary.
fn facedex() -> Command {
    Command::cargo_bin("facedex").unwrap()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    facedex()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Photo face indexing"))
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("getface"))
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_displays_version() {
    facedex()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("facedex"));
}

#[test]
fn test_ingest_help_shows_options() {
    facedex()
        .args(["ingest", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--storage-root"))
        .stdout(predicate::str::contains("--no-process"))
        .stdout(predicate::str::contains("FILE"));
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_missing_subcommand_is_usage_error() {
    // clap exits with 2 on usage errors
    facedex().assert().failure().code(2);
}

#[test]
fn test_ingest_missing_file_fails() {
    facedex()
        .args(["ingest", "/definitely/not/here.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_ingest_rejects_non_jpg_name_before_network() {
    facedex()
        .args([
            "--server",
            "http://127.0.0.1:1",
            "ingest",
            "photo.png",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid photo name"));
}

#[test]
fn test_status_unreachable_server_is_network_error() {
    facedex()
        .args(["--server", "http://127.0.0.1:1", "status"])
        .assert()
        .failure()
        .code(69)
        .stderr(predicate::str::contains("request failed"));
}
