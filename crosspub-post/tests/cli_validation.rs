//! CLI integration tests for crosspub-post
//!
//! These exercise the argument handling and validation paths that resolve
//! before any backend request, plus the exit code when the backend is
//! unreachable. Publish flows against a live backend are covered by the
//! library's integration tests with a mock gateway.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Write a config file pointing at `base_url` and return its path
fn write_config(dir: &TempDir, base_url: &str, platforms: &[&str]) -> String {
    let config_path = dir.path().join("config.toml");
    let list = platforms
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(", ");
    let contents = format!(
        r#"
[api]
base_url = "{}"

[defaults]
platforms = [{}]
"#,
        base_url, list
    );
    fs::write(&config_path, contents).unwrap();
    config_path.to_string_lossy().to_string()
}

/// Path to a config file that does not exist, so defaults apply
fn missing_config(dir: &TempDir) -> String {
    dir.path().join("missing.toml").to_string_lossy().to_string()
}

/// Port that was just free, so connecting to it is refused
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[test]
fn test_help_flag_output() {
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Compose and publish posts across social platforms",
        ))
        .stdout(predicate::str::contains("USAGE EXAMPLES"))
        .stdout(predicate::str::contains("--platforms"))
        .stdout(predicate::str::contains("--draft"))
        .stdout(predicate::str::contains("--schedule"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_help_shows_exit_codes() {
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EXIT CODES"))
        .stdout(predicate::str::contains("2 - Configuration error"))
        .stdout(predicate::str::contains("3 - Invalid input"));
}

#[test]
fn test_version_flag_output() {
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crosspub-post"));
}

#[test]
fn test_empty_content_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.env("CROSSPUB_CONFIG", missing_config(&temp_dir))
        .arg("")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Content cannot be empty"));
}

#[test]
fn test_whitespace_content_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.env("CROSSPUB_CONFIG", missing_config(&temp_dir))
        .arg("   \n\t  ")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Content cannot be empty"));
}

#[test]
fn test_no_content_empty_stdin_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    // assert_cmd wires stdin to a closed pipe, so the content read is empty
    cmd.env("CROSSPUB_CONFIG", missing_config(&temp_dir))
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Content cannot be empty"));
}

#[test]
fn test_unknown_platform_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.env("CROSSPUB_CONFIG", missing_config(&temp_dir))
        .arg("Hello world")
        .arg("--platforms")
        .arg("myspace")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unknown platform: myspace"));
}

#[test]
fn test_unknown_platform_in_config_defaults_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, "http://127.0.0.1:1", &["myspace"]);

    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.env("CROSSPUB_CONFIG", config_path)
        .arg("Hello world")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unknown platform: myspace"));
}

#[test]
fn test_no_platform_selected_precedes_network() {
    let temp_dir = TempDir::new().unwrap();
    // The backend address is unreachable; exit code 3 (not 1) shows the
    // platform check ran before any request was attempted
    let config_path = write_config(&temp_dir, &format!("http://127.0.0.1:{}", closed_port()), &[]);

    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.env("CROSSPUB_CONFIG", config_path)
        .arg("Hello world")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No platform selected"));
}

#[test]
fn test_invalid_schedule_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.env("CROSSPUB_CONFIG", missing_config(&temp_dir))
        .arg("Hello world")
        .arg("--platforms")
        .arg("facebook")
        .arg("--schedule")
        .arg("@@@")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Invalid schedule"));
}

#[test]
fn test_invalid_format_rejected() {
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.arg("Hello world")
        .arg("--format")
        .arg("xml")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Invalid format 'xml'"));
}

#[test]
fn test_invalid_log_format_rejected() {
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.arg("Hello world")
        .arg("--log-format")
        .arg("pretty")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Invalid log format: 'pretty'"));
}

#[test]
fn test_draft_and_schedule_conflict() {
    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.arg("Hello world")
        .arg("--draft")
        .arg("--schedule")
        .arg("+2h")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains(
            "Cannot use --draft and --schedule together",
        ));
}

#[test]
fn test_unreachable_backend_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        &temp_dir,
        &format!("http://127.0.0.1:{}", closed_port()),
        &["facebook"],
    );

    let mut cmd = Command::cargo_bin("crosspub-post").unwrap();

    cmd.env("CROSSPUB_CONFIG", config_path)
        .arg("Hello world")
        .arg("--draft")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}
