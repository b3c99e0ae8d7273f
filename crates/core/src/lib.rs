// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bpaudit-core: Backport reconciliation engine
//!
//! This crate compares what release-tracking issues declare (fix versions,
//! backport request labels) with what the code host shows actually happened
//! (merged pull requests per maintenance branch) and reports discrepancies.
//! It performs no I/O of its own; the code host is reached through the
//! [`CodeHost`] trait.

pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod host;
pub mod issue;
pub mod link;
pub mod pull;
pub mod version;

#[cfg(test)]
mod test_helpers;

pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
pub use engine::{
    collect_diagnostics, BackportRecord, EffectivePull, EngineConfig, IssueReport, PullAnalysis,
    Reconciler,
};
pub use error::{Error, Result};
pub use host::{collect_evidence, CodeHost, CommitPull, CommitReference, Evidence};
pub use issue::{sort_issues, Issue};
pub use link::LinkRules;
pub use pull::{canonical_url, Comment, CommitRef, PrState, PullRef, PullRequest, RepoRef, TimelineEvent};
pub use version::normalize;
