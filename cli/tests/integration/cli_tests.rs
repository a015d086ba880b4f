//! Integration tests for the hoist CLI surface: parsing, `version`, `render`
//! and error reporting.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn hoist() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hoist"));
    cmd.env("NO_COLOR", "1")
        .env("HOIST_CONFIG", "/nonexistent/hoist/config.yaml")
        .env_remove("HOIST_PASSWORD")
        .env_remove("HOIST_PASSPHRASE")
        .env_remove("HOIST_LOG");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    hoist().assert().code(2).stderr(predicate::str::contains(
        "Idempotent single-host provisioning over SSH",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    hoist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    hoist()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_shows_version() {
    hoist()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "hoist {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_json_is_valid() {
    let output = hoist()
        .args(["version", "--json"])
        .output()
        .expect("run hoist");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("version --json prints JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_fails() {
    hoist().arg("teleport").assert().code(2);
}

#[test]
fn test_provision_requires_domain_and_host() {
    hoist()
        .arg("provision")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--host"))
        .stderr(predicate::str::contains("--domain"));
}

// --- render ---

#[test]
fn test_render_prints_every_artifact() {
    hoist()
        .args(["render", "--domain", "example.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# /opt/my-twitter/.env"))
        .stdout(predicate::str::contains("# /opt/my-twitter/frontend/.env"))
        .stdout(predicate::str::contains("# /opt/my-twitter/docker-compose.yml"))
        .stdout(predicate::str::contains("# /etc/nginx/conf.d/example.org.conf"))
        .stdout(predicate::str::contains(
            "FRONTEND_URLS=https://example.org,http://example.org",
        ))
        .stdout(predicate::str::contains("VITE_API_URL=https://example.org"));
}

#[test]
fn test_render_redacts_the_secret_by_default() {
    hoist()
        .args(["render", "--domain", "example.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JWT_SECRET=<redacted>"));
}

#[test]
fn test_render_show_secret_generates_one() {
    let output = hoist()
        .args(["render", "--domain", "example.org", "--show-secret"])
        .output()
        .expect("run hoist");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8");
    let secret = stdout
        .lines()
        .find_map(|l| l.strip_prefix("JWT_SECRET="))
        .expect("secret line");
    assert_eq!(secret.len(), 48);
    assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_render_json_lists_paths_and_modes() {
    let output = hoist()
        .args(["render", "--domain", "Example.ORG", "--path", "/srv/app", "--json"])
        .output()
        .expect("run hoist");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    let artifacts = value.as_array().expect("array");
    assert_eq!(artifacts.len(), 4);
    assert_eq!(artifacts[0]["path"], "/srv/app/.env");
    assert_eq!(artifacts[0]["mode"], 0o600);
    assert_eq!(artifacts[3]["path"], "/etc/nginx/conf.d/example.org.conf");
}

// --- errors ---

#[test]
fn test_invalid_domain_is_reported() {
    hoist()
        .args(["render", "--domain", "not a domain"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Invalid domain"));
}

#[test]
fn test_invalid_domain_json_error_has_code() {
    let output = hoist()
        .args(["render", "--domain", "no_dots", "--json"])
        .output()
        .expect("run hoist");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON error");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "INVALID_ARGUMENT");
}

#[test]
fn test_unsafe_deploy_path_is_rejected() {
    hoist()
        .args(["render", "--domain", "example.org", "--path", "/opt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid deploy path"));
}

#[test]
fn test_provision_without_credential_fails_before_connecting() {
    hoist()
        .args([
            "provision",
            "--host",
            "203.0.113.7",
            "--domain",
            "example.org",
            "--yes",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No credential given"));
}

#[test]
fn test_bad_host_key_policy_is_rejected() {
    hoist()
        .args([
            "plan",
            "--host",
            "203.0.113.7",
            "--domain",
            "example.org",
            "--password",
            "x",
            "--host-key-policy",
            "trust-me",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("trust-me"));
}
