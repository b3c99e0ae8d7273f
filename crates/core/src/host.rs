// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The code-host contract and evidence collection.
//!
//! The engine never talks to the network itself. It asks a [`CodeHost`] for
//! snapshots and gathers them into an [`Evidence`] bundle that link
//! resolution interprets without further I/O.

use futures_util::future::BoxFuture;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::Result;
use crate::pull::{Comment, CommitRef, PullRequest, RepoRef, TimelineEvent};

/// Read-only access to the code host.
///
/// Implementations own retries, rate limiting and pagination. A missing pull
/// request must be reported as [`Error::PullRequestNotFound`](crate::Error::PullRequestNotFound)
/// so the engine can degrade it to a diagnostic.
pub trait CodeHost: Send + Sync {
    /// Fetches a pull request by web or API URL.
    fn pull_request<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<PullRequest>>;

    /// All comments on a pull request, oldest first.
    fn comments<'a>(&'a self, pull: &'a PullRequest) -> BoxFuture<'a, Result<Vec<Comment>>>;

    /// All timeline events of a pull request, oldest first.
    fn timeline<'a>(&'a self, pull: &'a PullRequest)
        -> BoxFuture<'a, Result<Vec<TimelineEvent>>>;

    /// Pull requests associated with a commit.
    fn commit_pull_requests<'a>(
        &'a self,
        commit: &'a CommitRef,
    ) -> BoxFuture<'a, Result<Vec<PullRequest>>>;

    /// Full message of a commit.
    fn commit_message<'a>(&'a self, commit: &'a CommitRef) -> BoxFuture<'a, Result<String>>;

    /// Every branch name in a repository.
    fn branches<'a>(&'a self, repo: &'a RepoRef) -> BoxFuture<'a, Result<BTreeSet<String>>>;

    /// Branches whose history contains `sha`, without remote-tracking prefixes.
    fn branches_containing<'a>(
        &'a self,
        repo: &'a RepoRef,
        sha: &'a str,
    ) -> BoxFuture<'a, Result<BTreeSet<String>>>;

    /// Raw version string of the development branch.
    fn development_version<'a>(&'a self, repo: &'a RepoRef) -> BoxFuture<'a, Result<String>>;
}

/// A pull request associated with a commit that referenced the audited one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPull {
    pub url: String,
    pub title: String,
    /// Message of the candidate's merge commit, when it has one.
    pub merge_commit_message: Option<String>,
}

/// Pull requests reached through one referencing commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReference {
    pub commit: CommitRef,
    pub pulls: Vec<CommitPull>,
}

/// Raw evidence about a pull request, uninterpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    pub comments: Vec<Comment>,
    pub events: Vec<TimelineEvent>,
    pub commit_references: Vec<CommitReference>,
}

/// Fetches comments, timeline and commit references for `pull`.
///
/// Steps run sequentially. A commit or merge commit that no longer resolves
/// is skipped; any other failure is returned.
pub async fn collect_evidence(host: &dyn CodeHost, pull: &PullRequest) -> Result<Evidence> {
    let comments = host.comments(pull).await?;
    let events = host.timeline(pull).await?;

    let mut commit_references = Vec::new();
    for event in &events {
        let TimelineEvent::Referenced {
            commit: Some(commit),
        } = event
        else {
            continue;
        };

        let candidates = match host.commit_pull_requests(commit).await {
            Ok(candidates) => candidates,
            Err(e) if e.is_not_found() => {
                debug!("commit {} has no pull requests: {}", commit.sha, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut pulls = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let merge_commit_message = match &candidate.merge_commit {
                Some(sha) => {
                    let merge_commit = CommitRef {
                        repo: candidate.repo().clone(),
                        sha: sha.clone(),
                    };
                    match host.commit_message(&merge_commit).await {
                        Ok(message) => Some(message),
                        Err(e) if e.is_not_found() => None,
                        Err(e) => return Err(e),
                    }
                }
                None => None,
            };
            pulls.push(CommitPull {
                url: candidate.html_url,
                title: candidate.title,
                merge_commit_message,
            });
        }

        commit_references.push(CommitReference {
            commit: commit.clone(),
            pulls,
        });
    }

    Ok(Evidence {
        comments,
        events,
        commit_references,
    })
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
