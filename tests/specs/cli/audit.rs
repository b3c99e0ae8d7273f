// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `bpaudit audit` that need no network.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn bp(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("bpaudit");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("GITHUB_TOKEN", "test-token")
        .env_remove("BPAUDIT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_snapshot(dir: &Path, relative: &str) {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let issues = json!([
        {"key": "AAH-2", "fields": {"status": {"name": "Done"}, "fixVersions": [], "customfield_12310220": ["https://github.com/ansible/galaxy_ng/pull/1"]}},
        {"key": "AAH-1", "fields": {"status": {"name": "New"}, "fixVersions": [{"name": "4.3"}], "customfield_12310220": null}}
    ]);
    std::fs::write(path, issues.to_string()).unwrap();
}

#[test]
fn audit_requires_github_token() {
    let temp = TempDir::new().unwrap();
    bp(temp.path())
        .env_remove("GITHUB_TOKEN")
        .arg("audit")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: GITHUB_TOKEN must be exported"));
}

#[test]
fn audit_requires_snapshot() {
    let temp = TempDir::new().unwrap();
    bp(temp.path())
        .arg("audit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("snapshot not found: .data/jiras.json"))
        .stderr(predicate::str::contains("bpaudit snapshot"));
}

#[test]
fn audit_without_auditable_issues_succeeds() {
    let temp = TempDir::new().unwrap();
    write_snapshot(temp.path(), ".data/jiras.json");

    bp(temp.path())
        .args(["audit", "-q"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn audit_json_without_diagnostics_is_empty_array() {
    let temp = TempDir::new().unwrap();
    write_snapshot(temp.path(), ".data/jiras.json");

    bp(temp.path())
        .args(["audit", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn audit_reads_snapshot_path_from_config() {
    let temp = TempDir::new().unwrap();
    write_snapshot(temp.path(), "elsewhere/issues.json");
    std::fs::write(
        temp.path().join("bpaudit.toml"),
        "[snapshot]\npath = \"elsewhere/issues.json\"\n",
    )
    .unwrap();

    bp(temp.path()).args(["audit", "--issue", "AAH-1"]).assert().success();
}

#[test]
fn audit_rejects_invalid_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("bpaudit.toml"), "jobs = 0\n").unwrap();

    bp(temp.path())
        .arg("audit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration: jobs must be at least 1"));
}

#[test]
fn audit_rejects_unknown_config_keys() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("bpaudit.toml"), "colour = true\n").unwrap();

    bp(temp.path())
        .arg("audit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("toml error"));
}

#[test]
fn audit_explicit_config_must_exist() {
    let temp = TempDir::new().unwrap();
    bp(temp.path())
        .args(["audit", "--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read missing.toml"));
}

#[test]
fn audit_config_from_environment() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "jobs = 0\n").unwrap();

    bp(temp.path())
        .env("BPAUDIT_CONFIG", &config)
        .arg("audit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("jobs must be at least 1"));
}
