//! Integration tests for the `panfly` CLI binary.
//!
//! Argument parsing, help, completions and error exit codes run offline;
//! the end-to-end cases talk to a wiremock appliance.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `panfly` with env isolation: no `PANFLY_*` variables and a config
/// directory that does not exist.
fn panfly_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("panfly");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("PANFLY_PROFILE")
        .env_remove("PANFLY_HOST")
        .env_remove("PANFLY_API_KEY")
        .env_remove("PANFLY_TARGET")
        .env_remove("PANFLY_VSYS")
        .env_remove("PANFLY_OUTPUT")
        .env_remove("PANFLY_INSECURE")
        .env_remove("PANFLY_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = panfly_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_command_groups() {
    let home = tempfile::tempdir().unwrap();
    panfly_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("system")
            .and(predicate::str::contains("sessions"))
            .and(predicate::str::contains("policy"))
            .and(predicate::str::contains("logs"))
            .and(predicate::str::contains("--target")),
    );
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    panfly_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_no_config_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    panfly_cmd(home.path())
        .args(["system", "info"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No firewall configured"));
}

#[test]
fn test_unknown_profile_exit_code() {
    let home = tempfile::tempdir().unwrap();
    panfly_cmd(home.path())
        .args(["--profile", "nope", "system", "info"])
        .assert()
        .code(4);
}

#[test]
fn test_missing_api_key_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    panfly_cmd(home.path())
        .args(["--host", "127.0.0.1:1", "system", "info"])
        .assert()
        .code(3);
}

// ── Config round trip ───────────────────────────────────────────────

#[test]
fn test_config_init_then_show_redacts_key() {
    let home = tempfile::tempdir().unwrap();
    panfly_cmd(home.path())
        .args([
            "config",
            "init",
            "--name",
            "lab",
            "--address",
            "fw-lab.example.net",
            "--store-api-key",
            "LUFRPT1secret==",
        ])
        .assert()
        .success();

    panfly_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("fw-lab.example.net")
                .and(predicate::str::contains("<stored>"))
                .and(predicate::str::contains("LUFRPT1secret").not()),
        );
}

// ── Against a mock appliance ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_system_info_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(header("X-PAN-KEY", "test-key"))
        .and(body_string_contains("type=op"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<response status="success"><result><system>
                 <hostname>fw01</hostname><serial>0011223344</serial><model>PA-440</model>
               </system></result></response>"#,
        ))
        .mount(&server)
        .await;

    let uri = server.uri();
    let home = tempfile::tempdir().unwrap();
    let home_path = home.path().to_owned();
    let output = tokio::task::spawn_blocking(move || {
        panfly_cmd(&home_path)
            .args(["--host", &uri, "--api-key", "test-key", "-o", "json", "system", "info"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    let text = combined_output(&output);
    assert!(output.status.success(), "{text}");
    assert!(text.contains("\"hostname\": \"fw01\""), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_request_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"<response status="error" code="403"><result><msg>Invalid Credential</msg></result></response>"#,
        ))
        .mount(&server)
        .await;

    let uri = server.uri();
    let home = tempfile::tempdir().unwrap();
    let home_path = home.path().to_owned();
    let output = tokio::task::spawn_blocking(move || {
        panfly_cmd(&home_path)
            .args(["--host", &uri, "--api-key", "bad", "network", "arp"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
