// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pull-request snapshots and the evidence attached to them.
//!
//! A [`PullRequest`] is an immutable snapshot fetched on demand from the code
//! host. Its [`PrState`] is derived from the snapshot; the only transition
//! this engine performs is `ClosedUnmerged -> Superseded`, and it does so by
//! producing a new value rather than mutating the fetched one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};

/// An `owner/name` repository on the code host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoRef {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Repository names on the code host are case-insensitive.
    pub fn same_as(&self, other: &RepoRef) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner) && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The owner/repo/number triple identifying a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PullRef {
    pub repo: RepoRef,
    pub number: u64,
}

impl PullRef {
    pub fn new(repo: RepoRef, number: u64) -> Self {
        PullRef { repo, number }
    }

    /// Parses a web or API URL of a pull request (or of the issue backing it).
    ///
    /// Accepts `https://<host>/<owner>/<repo>/pull/<n>`, the `pulls` and
    /// `issues` variants, and `https://api.<host>/repos/<owner>/<repo>/pulls/<n>`.
    /// Query strings, fragments, trailing path segments and trailing
    /// punctuation after the number are ignored.
    pub fn parse(url: &str) -> Result<Self> {
        parse_pull_url(url).ok_or_else(|| Error::InvalidPullRequestUrl(url.to_string()))
    }

    /// Same pull request, comparing repositories case-insensitively.
    pub fn same_as(&self, other: &PullRef) -> bool {
        self.number == other.number && self.repo.same_as(&other.repo)
    }

    /// Web URL of the pull request on `host`.
    pub fn html_url(&self, host: &str) -> String {
        format!(
            "https://{}/{}/{}/pull/{}",
            host, self.repo.owner, self.repo.name, self.number
        )
    }
}

impl fmt::Display for PullRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

fn parse_pull_url(url: &str) -> Option<PullRef> {
    let trimmed = url.trim();
    let path = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    let path = path
        .strip_prefix("https://")
        .or_else(|| path.strip_prefix("http://"))
        .unwrap_or(path);

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let _host = segments.next()?;
    let mut owner = segments.next()?;
    if owner == "repos" {
        owner = segments.next()?;
    }
    let name = segments.next()?;
    if !matches!(segments.next()?, "pull" | "pulls" | "issues" | "issue") {
        return None;
    }
    let digits: String = segments
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let number = digits.parse().ok()?;

    Some(PullRef::new(RepoRef::new(owner, name), number))
}

/// Rewrites a pull-request URL to its canonical web form on `host`.
///
/// URLs that do not parse are returned trimmed but otherwise untouched, so
/// that they still surface as "could not find" diagnostics downstream.
pub fn canonical_url(url: &str, host: &str) -> String {
    match PullRef::parse(url) {
        Ok(pull) => pull.html_url(host),
        Err(_) => url.trim().to_string(),
    }
}

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    Open,
    Merged,
    /// Closed without merge.
    ClosedUnmerged,
    /// Closed without merge and replaced by exactly one successor.
    Superseded,
}

impl PrState {
    /// Derives the initial state from the fetched snapshot flags.
    pub fn from_snapshot(merged: bool, closed: bool) -> Self {
        if merged {
            PrState::Merged
        } else if closed {
            PrState::ClosedUnmerged
        } else {
            PrState::Open
        }
    }

    /// Returns the string representation used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Merged => "merged",
            PrState::ClosedUnmerged => "closed_unmerged",
            PrState::Superseded => "superseded",
        }
    }

    /// Only a closed-unmerged pull request can be superseded.
    pub fn can_transition_to(&self, target: PrState) -> bool {
        matches!((self, target), (PrState::ClosedUnmerged, PrState::Superseded))
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable snapshot of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: PullRef,
    /// Web URL as reported by the host.
    pub html_url: String,
    /// Login of the author.
    pub author: String,
    pub title: String,
    pub state: PrState,
    /// Branch the pull request targets.
    pub base_branch: String,
    /// Present only once merged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_commit: Option<String>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.state == PrState::Merged
    }

    pub fn is_closed_unmerged(&self) -> bool {
        self.state == PrState::ClosedUnmerged
    }

    pub fn repo(&self) -> &RepoRef {
        &self.id.repo
    }

    /// Label suffixes for every label starting with `prefix`.
    ///
    /// `labels_with_prefix("backport-")` on `{"backport-4.3", "bug"}` is `{"4.3"}`.
    pub fn labels_with_prefix(&self, prefix: &str) -> BTreeSet<String> {
        self.labels
            .iter()
            .filter_map(|label| label.strip_prefix(prefix))
            .map(str::to_string)
            .collect()
    }

    /// Returns true if the base branch is a maintenance branch.
    pub fn targets_maintenance(&self, maintenance_prefix: &str) -> bool {
        self.base_branch.starts_with(maintenance_prefix)
    }

    /// Base branch with the maintenance prefix stripped.
    pub fn target_branch(&self, maintenance_prefix: &str) -> &str {
        self.base_branch
            .strip_prefix(maintenance_prefix)
            .unwrap_or(&self.base_branch)
    }

    /// Returns a copy in the `Superseded` state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the pull request was
    /// closed without merge.
    pub fn superseded(&self) -> Result<PullRequest> {
        if !self.state.can_transition_to(PrState::Superseded) {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: PrState::Superseded.to_string(),
            });
        }
        Ok(PullRequest {
            state: PrState::Superseded,
            ..self.clone()
        })
    }
}

/// A comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Login of the comment author.
    pub author: String,
    pub body: String,
}

impl Comment {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Comment {
            author: author.into(),
            body: body.into(),
        }
    }
}

/// A commit in a specific repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitRef {
    pub repo: RepoRef,
    pub sha: String,
}

/// A timeline event on a pull request, reduced to what link resolution uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    /// Another issue or pull request mentioned this one.
    CrossReferenced { source_url: String },
    /// A commit mentioned this pull request.
    Referenced { commit: Option<CommitRef> },
    /// Any other event kind.
    Other { kind: String },
}

#[cfg(test)]
#[path = "pull_tests.rs"]
mod tests;
