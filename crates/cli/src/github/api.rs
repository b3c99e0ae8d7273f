// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub REST payloads, reduced to the fields the audit reads.

use bpaudit_core::{
    Comment, CommitRef, PrState, PullRef, PullRequest, RepoRef, Result, TimelineEvent,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiBase {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// A pull request as returned by `/pulls/{n}` and `/commits/{sha}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPull {
    pub html_url: String,
    pub user: ApiUser,
    #[serde(default)]
    pub title: String,
    /// `open` or `closed`.
    pub state: String,
    /// Only present on the single pull request endpoint.
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    pub base: ApiBase,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
}

impl ApiPull {
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(self.merged_at.is_some())
    }

    pub fn into_pull(self) -> Result<PullRequest> {
        let id = PullRef::parse(&self.html_url)?;
        let merged = self.is_merged();
        let state = PrState::from_snapshot(merged, self.state == "closed");
        Ok(PullRequest {
            id,
            html_url: self.html_url,
            author: self.user.login,
            title: self.title,
            state,
            base_branch: self.base.ref_name,
            // Open pull requests carry a test-merge sha; only a real merge counts.
            merge_commit: if merged { self.merge_commit_sha } else { None },
            labels: self.labels.into_iter().map(|l| l.name).collect(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiComment {
    pub user: ApiUser,
    #[serde(default)]
    pub body: Option<String>,
}

impl From<ApiComment> for Comment {
    fn from(c: ApiComment) -> Self {
        Comment::new(c.user.login, c.body.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiIssueRef {
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEventSource {
    #[serde(default)]
    pub issue: Option<ApiIssueRef>,
}

/// One entry of `/issues/{n}/timeline`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTimelineEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub source: Option<ApiEventSource>,
    #[serde(default)]
    pub commit_url: Option<String>,
}

impl From<ApiTimelineEvent> for TimelineEvent {
    fn from(e: ApiTimelineEvent) -> Self {
        match e.event.as_deref() {
            Some("cross-referenced") => match e.source.and_then(|s| s.issue) {
                Some(issue) => TimelineEvent::CrossReferenced {
                    source_url: issue.html_url,
                },
                None => TimelineEvent::Other {
                    kind: "cross-referenced".to_string(),
                },
            },
            Some("referenced") => TimelineEvent::Referenced {
                commit: e.commit_url.as_deref().and_then(parse_commit_url),
            },
            other => TimelineEvent::Other {
                kind: other.unwrap_or_default().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommitDetail {
    pub message: String,
}

/// `/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommit {
    pub sha: String,
    pub commit: ApiCommitDetail,
}

/// Entry of `/commits?sha={branch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommitSummary {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiBranch {
    pub name: String,
}

/// Parses `https://api.github.com/repos/{owner}/{repo}/commits/{sha}`.
pub fn parse_commit_url(url: &str) -> Option<CommitRef> {
    let mut segments = url.split('/').skip_while(|s| *s != "repos").skip(1);
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let name = segments.next().filter(|s| !s.is_empty())?;
    if segments.next()? != "commits" {
        return None;
    }
    let sha = segments.next().filter(|s| !s.is_empty())?;
    Some(CommitRef {
        repo: RepoRef::new(owner, name),
        sha: sha.to_string(),
    })
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
