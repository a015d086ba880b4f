//! Integration tests for `hoist config` and config-file precedence.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hoist_with_config(path: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hoist"));
    cmd.env("NO_COLOR", "1").env("HOIST_CONFIG", path);
    cmd
}

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, content).expect("write config");
    (dir, path)
}

#[test]
fn test_config_path_honours_env() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("elsewhere.yaml");
    hoist_with_config(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere.yaml"));
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    let dir = TempDir::new().expect("temp dir");
    hoist_with_config(&dir.path().join("absent.yaml"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user: root"))
        .stdout(predicate::str::contains("/opt/my-twitter"))
        .stdout(predicate::str::contains("known-hosts"));
}

#[test]
fn test_config_show_reads_file_values() {
    let (_dir, path) = write_config("ssh:\n  user: deploy\n  port: 2222\n");
    let output = hoist_with_config(&path)
        .args(["config", "show", "--json"])
        .output()
        .expect("run hoist");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(value["config"]["ssh"]["user"], "deploy");
    assert_eq!(value["config"]["ssh"]["port"], 2222);
    assert_eq!(value["config"]["deploy"]["branch"], "main");
}

#[test]
fn test_config_deploy_path_reaches_render() {
    let (_dir, path) = write_config("deploy:\n  path: /srv/twitter\n");
    hoist_with_config(&path)
        .args(["render", "--domain", "example.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# /srv/twitter/docker-compose.yml"));
}

#[test]
fn test_malformed_config_fails() {
    let (_dir, path) = write_config("deploy: [\n");
    hoist_with_config(&path)
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}
