// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: pull-request fixtures and an in-memory code host.

use futures_util::future::BoxFuture;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::host::CodeHost;
use crate::pull::{Comment, CommitRef, PrState, PullRef, PullRequest, RepoRef, TimelineEvent};

pub const HOST: &str = "github.com";

pub fn repo() -> RepoRef {
    RepoRef::new("ansible", "galaxy_ng")
}

/// Web URL of pull request `number` in the test repository.
pub fn url(number: u64) -> String {
    PullRef::new(repo(), number).html_url(HOST)
}

/// An open pull request against the development branch.
pub fn pull(number: u64) -> PullRequest {
    PullRequest {
        id: PullRef::new(repo(), number),
        html_url: url(number),
        author: format!("dev{number}"),
        title: format!("Change {number}"),
        state: PrState::Open,
        base_branch: "master".to_string(),
        merge_commit: None,
        labels: BTreeSet::new(),
    }
}

pub fn merged_pull(number: u64, merge_commit: &str) -> PullRequest {
    PullRequest {
        state: PrState::Merged,
        merge_commit: Some(merge_commit.to_string()),
        ..pull(number)
    }
}

pub fn closed_pull(number: u64) -> PullRequest {
    PullRequest {
        state: PrState::ClosedUnmerged,
        ..pull(number)
    }
}

/// A pull request against `stable-<version>`.
pub fn backport_pull(number: u64, version: &str, merged: bool) -> PullRequest {
    let base = if merged {
        merged_pull(number, &format!("bp{number}"))
    } else {
        pull(number)
    };
    PullRequest {
        base_branch: format!("stable-{version}"),
        title: format!("[{version}] Backport"),
        ..base
    }
}

pub fn with_labels(mut pull: PullRequest, labels: &[&str]) -> PullRequest {
    pull.labels = labels.iter().map(|l| l.to_string()).collect();
    pull
}

pub fn commit(sha: &str) -> CommitRef {
    CommitRef {
        repo: repo(),
        sha: sha.to_string(),
    }
}

/// In-memory [`CodeHost`].
#[derive(Default)]
pub struct MockHost {
    pulls: HashMap<String, PullRequest>,
    comments: HashMap<String, Vec<Comment>>,
    timelines: HashMap<String, Vec<TimelineEvent>>,
    commit_pulls: HashMap<String, Vec<PullRequest>>,
    messages: HashMap<String, String>,
    containing: HashMap<String, BTreeSet<String>>,
    branches: BTreeSet<String>,
    dev_version: Option<String>,
    unavailable: BTreeSet<String>,
    broken_ancestry: BTreeSet<String>,
    fetched: Mutex<Vec<String>>,
}

impl MockHost {
    pub fn new() -> Self {
        MockHost {
            dev_version: Some("4.4.0.dev".to_string()),
            ..Default::default()
        }
    }

    pub fn with_pull(mut self, pull: PullRequest) -> Self {
        self.pulls.insert(pull.html_url.clone(), pull);
        self
    }

    pub fn with_comment(mut self, number: u64, author: &str, body: &str) -> Self {
        self.comments
            .entry(url(number))
            .or_default()
            .push(Comment::new(author, body));
        self
    }

    pub fn with_event(mut self, number: u64, event: TimelineEvent) -> Self {
        self.timelines.entry(url(number)).or_default().push(event);
        self
    }

    pub fn with_commit_pulls(mut self, sha: &str, pulls: Vec<PullRequest>) -> Self {
        self.commit_pulls.insert(sha.to_string(), pulls);
        self
    }

    pub fn with_commit_message(mut self, sha: &str, message: &str) -> Self {
        self.messages.insert(sha.to_string(), message.to_string());
        self
    }

    pub fn with_containing(mut self, sha: &str, branches: &[&str]) -> Self {
        self.containing
            .insert(sha.to_string(), branches.iter().map(|b| b.to_string()).collect());
        self
    }

    pub fn with_branches(mut self, branches: &[&str]) -> Self {
        self.branches = branches.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn with_dev_version(mut self, version: Option<&str>) -> Self {
        self.dev_version = version.map(str::to_string);
        self
    }

    /// Fetching `url` fails as if retries were exhausted.
    pub fn with_unavailable(mut self, url: &str) -> Self {
        self.unavailable.insert(url.to_string());
        self
    }

    /// Looking up branches containing `sha` fails outright.
    pub fn with_broken_ancestry(mut self, sha: &str) -> Self {
        self.broken_ancestry.insert(sha.to_string());
        self
    }

    /// URLs passed to `pull_request`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl CodeHost for MockHost {
    fn pull_request<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<PullRequest>> {
        Box::pin(async move {
            if let Ok(mut fetched) = self.fetched.lock() {
                fetched.push(url.to_string());
            }
            if self.unavailable.contains(url) {
                return Err(Error::Transient(format!("rate limited: {url}")));
            }
            let id = PullRef::parse(url)?;
            self.pulls
                .values()
                .find(|p| p.id.same_as(&id))
                .cloned()
                .ok_or_else(|| Error::PullRequestNotFound(url.to_string()))
        })
    }

    fn comments<'a>(&'a self, pull: &'a PullRequest) -> BoxFuture<'a, Result<Vec<Comment>>> {
        Box::pin(async move { Ok(self.comments.get(&pull.html_url).cloned().unwrap_or_default()) })
    }

    fn timeline<'a>(
        &'a self,
        pull: &'a PullRequest,
    ) -> BoxFuture<'a, Result<Vec<TimelineEvent>>> {
        Box::pin(async move { Ok(self.timelines.get(&pull.html_url).cloned().unwrap_or_default()) })
    }

    fn commit_pull_requests<'a>(
        &'a self,
        commit: &'a CommitRef,
    ) -> BoxFuture<'a, Result<Vec<PullRequest>>> {
        Box::pin(async move {
            Ok(self
                .commit_pulls
                .get(&commit.sha)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn commit_message<'a>(&'a self, commit: &'a CommitRef) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.messages
                .get(&commit.sha)
                .cloned()
                .ok_or_else(|| Error::PullRequestNotFound(commit.sha.clone()))
        })
    }

    fn branches<'a>(&'a self, _repo: &'a RepoRef) -> BoxFuture<'a, Result<BTreeSet<String>>> {
        Box::pin(async move { Ok(self.branches.clone()) })
    }

    fn branches_containing<'a>(
        &'a self,
        _repo: &'a RepoRef,
        sha: &'a str,
    ) -> BoxFuture<'a, Result<BTreeSet<String>>> {
        Box::pin(async move {
            if self.broken_ancestry.contains(sha) {
                return Err(Error::Host(format!("git clone failed for {sha}")));
            }
            Ok(self.containing.get(sha).cloned().unwrap_or_default())
        })
    }

    fn development_version<'a>(&'a self, repo: &'a RepoRef) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.dev_version
                .clone()
                .ok_or_else(|| Error::InvalidInput(format!("no version for {repo}")))
        })
    }
}
