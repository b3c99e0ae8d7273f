// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `bpaudit normalize`.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn bp() -> Command {
    let mut cmd = cargo_bin_cmd!("bpaudit");
    cmd.env("NO_COLOR", "1").env_remove("BPAUDIT_CONFIG");
    cmd
}

#[test]
fn normalize_prints_release_lines() {
    bp().args(["normalize", "4.3.1", "4.2.0 GA", "4.4cloud", "cloud", "latest"])
        .assert()
        .success()
        .stdout("4.3.1\t4.3\n4.2.0 GA\t4.2\n4.4cloud\t4.4\ncloud\t-\nlatest\t-\n");
}

#[test]
fn normalize_requires_a_version() {
    bp().arg("normalize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn normalize_ignores_broken_config() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::write(temp.path().join("bpaudit.toml"), "jobs = \"many\"").unwrap();

    bp().args(["normalize", "4.3"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout("4.3\t4.3\n");
}
