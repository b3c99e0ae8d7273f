// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns a non-empty, trimmed value of `name`.
fn non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the `GITHUB_TOKEN` value, if set and non-empty.
pub fn github_token() -> Option<String> {
    non_empty(vars::GITHUB_TOKEN)
}

/// Returns the `JIRA_TOKEN` value, if set and non-empty.
pub fn jira_token() -> Option<String> {
    non_empty(vars::JIRA_TOKEN)
}

/// Returns the `BPAUDIT_CONFIG` path, if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::BPAUDIT_CONFIG).map(PathBuf::from)
}

/// Returns the `RUST_LOG` filter directive, if set.
pub fn log_filter() -> Option<String> {
    non_empty(vars::RUST_LOG)
}

/// Returns `true` if `NO_COLOR=1`.
pub fn no_color() -> bool {
    std::env::var(vars::NO_COLOR).is_ok_and(|v| v == "1")
}

/// Returns `true` if `COLOR=1`.
pub fn force_color() -> bool {
    std::env::var(vars::COLOR).is_ok_and(|v| v == "1")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
