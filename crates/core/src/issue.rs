// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Release-tracking issues.
//!
//! An issue declares the fix versions it targets and the pull requests that
//! implement it. Issues are loaded once per run and never mutated.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::version;

/// A release-tracking record from the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker key (e.g., "AAH-100").
    pub id: String,
    /// Workflow status name as reported by the tracker.
    pub status: String,
    /// Raw fix-version labels.
    #[serde(default)]
    pub fix_versions: Vec<String>,
    /// Referenced pull-request URLs.
    #[serde(default)]
    pub pull_requests: Vec<String>,
}

impl Issue {
    /// Creates an issue with no fix versions or pull requests.
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Issue {
            id: id.into(),
            status: status.into(),
            fix_versions: Vec::new(),
            pull_requests: Vec::new(),
        }
    }

    /// Adds a fix-version label (builder pattern).
    pub fn with_fix_version(mut self, label: impl Into<String>) -> Self {
        self.fix_versions.push(label.into());
        self
    }

    /// Adds a referenced pull-request URL (builder pattern).
    pub fn with_pull_request(mut self, url: impl Into<String>) -> Self {
        self.pull_requests.push(url.into());
        self
    }

    /// Lower-cased status, the form used for every comparison.
    pub fn status_key(&self) -> String {
        self.status.to_lowercase()
    }

    /// Numeric suffix of the key ("AAH-100" -> 100).
    pub fn number(&self) -> Option<u64> {
        self.id.rsplit('-').next()?.parse().ok()
    }

    /// Release names the fix versions map to, sorted and deduplicated.
    pub fn expected_versions(&self) -> BTreeSet<String> {
        version::normalize_all(&self.fix_versions)
    }

    /// Returns true if the issue carries enough data to be audited.
    pub fn is_auditable(&self) -> bool {
        !self.fix_versions.is_empty() && !self.pull_requests.is_empty()
    }
}

/// Orders issues newest first by numeric key suffix.
///
/// Keys without a numeric suffix sort last, by key.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        Reverse(a.number())
            .cmp(&Reverse(b.number()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
