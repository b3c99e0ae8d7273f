// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `bpaudit snapshot` that need no network.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn snapshot_requires_jira_token() {
    let temp = TempDir::new().unwrap();
    cargo_bin_cmd!("bpaudit")
        .current_dir(temp.path())
        .env_remove("JIRA_TOKEN")
        .env_remove("BPAUDIT_CONFIG")
        .arg("snapshot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: JIRA_TOKEN must be exported"));

    assert!(!temp.path().join(".data").exists());
}

#[test]
fn snapshot_rejects_invalid_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("bpaudit.toml"), "[jira]\npage_size = 0\n").unwrap();

    cargo_bin_cmd!("bpaudit")
        .current_dir(temp.path())
        .env("JIRA_TOKEN", "t")
        .env_remove("BPAUDIT_CONFIG")
        .arg("snapshot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("jira.page_size must be at least 1"));
}
