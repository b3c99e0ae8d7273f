// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for bpaudit-core operations.

use thiserror::Error;

/// All possible errors that can occur in bpaudit-core operations.
///
/// During reconciliation only [`Error::Transient`] aborts the run. Not-found
/// errors skip the link; anything else becomes a diagnostic for the pull
/// request being analysed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("pull request not found: {0}")]
    PullRequestNotFound(String),

    #[error("invalid pull request url: '{0}'\n  hint: expected https://<host>/<owner>/<repo>/pull/<number>")]
    InvalidPullRequestUrl(String),

    #[error("invalid state transition: cannot go from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("code host unavailable after retries: {0}")]
    Transient(String),

    #[error("code host error: {0}")]
    Host(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl Error {
    /// Returns true if the error means "this link does not resolve".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::PullRequestNotFound(_) | Error::InvalidPullRequestUrl(_)
        )
    }
}

/// A specialized Result type for bpaudit-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
