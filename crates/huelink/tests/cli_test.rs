//! Integration tests for the `huelink` CLI binary.
//!
//! Argument parsing, help output, completions, configuration handling,
//! and full runs against a mock bridge.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `huelink` binary with env isolation.
///
/// Clears all `HUELINK_*` env vars and points config/data directories at
/// a nonexistent path so tests never touch the user's real state.
fn huelink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("huelink");
    cmd.env("HOME", "/tmp/huelink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/huelink-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/huelink-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("HUELINK_CONFIG")
        .env_remove("HUELINK_BRIDGE")
        .env_remove("HUELINK_DEVICETYPE")
        .env_remove("HUELINK_INSECURE")
        .env_remove("HUELINK_CA_CERT")
        .env_remove("HUELINK_TIMEOUT")
        .env_remove("HUELINK_MAX_RETRIES")
        .env_remove("HUELINK_RETRY_DELAY_MS")
        .env_remove("HUELINK_PACING_MS")
        .env_remove("HUELINK_CONFIRMATION_TIMEOUT_SECS")
        .env_remove("HUELINK_CREDENTIALS_FILE")
        .env_remove("HUELINK_SNAPSHOT_FILE");
    cmd
}

/// A command wired to a bridge with state kept in `dir`.
fn bridge_cmd(bridge: &str, dir: &Path) -> assert_cmd::Command {
    let mut cmd = huelink_cmd();
    cmd.env("HUELINK_MAX_RETRIES", "0")
        .env("HUELINK_PACING_MS", "0")
        .env("HUELINK_SNAPSHOT_FILE", dir.join("my_lights.json"))
        .args(["--bridge", bridge, "--credentials"])
        .arg(dir.join("client_details.json"));
    cmd
}

fn write_credentials(dir: &Path) {
    std::fs::write(
        dir.join("client_details.json"),
        r#"{ "username": "cli-key", "clientkey": "CLIKEY" }"#,
    )
    .unwrap();
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_two_lights(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{ "id": "l1" }, { "id": "l2" }]
        })))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/l1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [{ "rid": "l1", "rtype": "light" }], "errors": [] })),
        )
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = huelink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    huelink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Hue bridge")
            .and(predicate::str::contains("set"))
            .and(predicate::str::contains("pair"))
            .and(predicate::str::contains("lights")),
    );
}

#[test]
fn test_version_flag() {
    huelink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("huelink"));
}

#[test]
fn test_completions_zsh() {
    huelink_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    huelink_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    let output = huelink_cmd()
        .args(["--output", "yaml", "lights"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_set_without_bridge_is_usage_error() {
    huelink_cmd()
        .args(["set", "0.3", "0.3", "50"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No bridge configured"));
}

#[test]
fn test_config_path_honours_flag() {
    huelink_cmd()
        .args(["--config", "/tmp/elsewhere/huelink.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere/huelink.toml"));
}

#[test]
fn test_config_show_without_file_renders_defaults() {
    huelink_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("devicetype = \"huelink#cli\""));
}

#[test]
fn test_config_init_writes_bridge() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    huelink_cmd()
        .arg("--config")
        .arg(&config)
        .args(["--bridge", "10.0.0.2", "config", "init"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("bridge = \"10.0.0.2\""), "{written}");

    huelink_cmd()
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.2"));
}

#[test]
fn test_config_init_rejects_bad_address() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    huelink_cmd()
        .arg("--config")
        .arg(&config)
        .args(["--bridge", "ftp://bridge", "config", "init"])
        .assert()
        .code(2);

    assert!(!config.exists());
}

// ── Bridge interaction ──────────────────────────────────────────────

#[test]
fn test_lights_without_credentials_asks_to_pair() {
    let dir = tempfile::tempdir().unwrap();
    bridge_cmd("http://127.0.0.1:9", dir.path())
        .arg("lights")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("huelink pair"));
}

#[test]
fn test_unreachable_bridge_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    write_credentials(dir.path());

    bridge_cmd("http://127.0.0.1:9", dir.path())
        .arg("lights")
        .assert()
        .code(7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lights_lists_ids() {
    let server = MockServer::start().await;
    mount_two_lights(&server).await;
    let dir = tempfile::tempdir().unwrap();
    write_credentials(dir.path());

    bridge_cmd(&server.uri(), dir.path())
        .args(["--output", "plain", "lights"])
        .assert()
        .success()
        .stdout("l1\nl2\n");

    assert!(dir.path().join("my_lights.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_reports_partial_failure() {
    let server = MockServer::start().await;
    mount_two_lights(&server).await;
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/l2"))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "data": [],
            "errors": [{ "description": "device unreachable" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_credentials(dir.path());

    let output = bridge_cmd(&server.uri(), dir.path())
        .args(["--output", "plain", "set", "0.3", "0.3", "50"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("l1\tok"), "{stdout}");
    assert!(stdout.contains("l2\trejected"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_without_values_uses_default_color() {
    let server = MockServer::start().await;
    mount_two_lights(&server).await;
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/l2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_credentials(dir.path());

    bridge_cmd(&server.uri(), dir.path())
        .args(["--output", "json", "set"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Using default color"))
        .stdout(predicate::str::contains("\"outcome\": \"success\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pair_without_terminal_is_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "address": "", "description": "link button not pressed" } }
        ])))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    bridge_cmd(&server.uri(), dir.path())
        .arg("pair")
        .assert()
        .code(10);

    assert!(!dir.path().join("client_details.json").exists());
}
