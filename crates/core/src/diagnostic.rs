// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Discrepancy records produced by reconciliation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of discrepancy a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A referenced pull request could not be resolved.
    PullRequestNotFound,
    /// The code host failed while a pull request was being analysed.
    HostError,
    /// Closed without merge and no replacement was found.
    ClosedWithoutMerge,
    /// Closed without merge with several possible replacements.
    AmbiguousSuccessors,
    /// Closed without merge and replaced; analysis continued on the successor.
    Superseded,
    /// Issue is in a done state but its pull request is not merged.
    DoneButNotMerged,
    /// A declared fix version has no backport pull request.
    MissingBackport,
    /// Backported to a version the issue does not declare.
    UndeclaredBackport,
    /// Done issue with no merged backport for a version.
    NoMergedBackport,
}

impl DiagnosticKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::PullRequestNotFound => "pull-request-not-found",
            DiagnosticKind::HostError => "host-error",
            DiagnosticKind::ClosedWithoutMerge => "closed-without-merge",
            DiagnosticKind::AmbiguousSuccessors => "ambiguous-successors",
            DiagnosticKind::Superseded => "superseded",
            DiagnosticKind::DoneButNotMerged => "done-but-not-merged",
            DiagnosticKind::MissingBackport => "missing-backport",
            DiagnosticKind::UndeclaredBackport => "undeclared-backport",
            DiagnosticKind::NoMergedBackport => "no-merged-backport",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single discrepancy. Always error severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Key of the issue the discrepancy belongs to.
    pub issue: String,
    pub kind: DiagnosticKind,
    /// Human-readable sentence, starting with the issue key.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Append-only diagnostic buffer for one issue.
///
/// Sinks are concatenated in issue order, which keeps output stable across
/// runs regardless of how issues were scheduled.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    issue: String,
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(issue: impl Into<String>) -> Self {
        DiagnosticSink {
            issue: issue.into(),
            entries: Vec::new(),
        }
    }

    /// Records a diagnostic for this sink's issue.
    pub fn emit(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{}: {}", kind, message);
        self.entries.push(Diagnostic {
            issue: self.issue.clone(),
            kind,
            message,
        });
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
#[path = "diagnostic_tests.rs"]
mod tests;
