// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the bpaudit CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] bpaudit_core::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{name} must be exported\n  hint: {hint}")]
    MissingCredential {
        name: &'static str,
        hint: &'static str,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("snapshot not found: {0}\n  hint: run 'bpaudit snapshot' first")]
    SnapshotNotFound(String),

    #[error("jira error: {0}")]
    Jira(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for bpaudit_core::Error {
    /// Collapses a CLI-side failure into the code-host error space.
    fn from(e: Error) -> Self {
        match e {
            Error::Core(inner) => inner,
            other => bpaudit_core::Error::Host(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
