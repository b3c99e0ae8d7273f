// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub REST client implementing [`CodeHost`].
//!
//! Requests are bounded by a semaphore and retried with exponential backoff
//! on network errors, 5xx, 429, and 403 with an exhausted rate limit. A 404
//! maps to [`bpaudit_core::Error::PullRequestNotFound`]; exhausting retries
//! maps to [`bpaudit_core::Error::Transient`].

use bpaudit_core::{
    CodeHost, Comment, CommitRef, PullRef, PullRequest, RepoRef, TimelineEvent,
};
use futures_util::future::BoxFuture;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use tokio::sync::Semaphore;
use tracing::debug;

use super::api::{
    ApiBranch, ApiComment, ApiCommit, ApiCommitSummary, ApiPull, ApiTimelineEvent,
};
use super::checkout::Checkouts;
use crate::config::{Ancestry, Config, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::{classify, retry_after, Backoff, Disposition};

const PER_PAGE: u32 = 100;
/// Branch-name fragments of bot branches skipped by API ancestry.
const BOT_BRANCH_MARKERS: [&str; 2] = ["dependabot", "patchback"];

/// Extracts the `rel="next"` target from a `Link` header.
pub fn next_link(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == "rel=\"next\"");
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        is_next.then(|| url.to_string())
    })
}

/// Appends `per_page` unless the URL already sets it.
pub fn with_per_page(url: &str) -> String {
    if url.contains("per_page=") {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&per_page={PER_PAGE}")
    } else {
        format!("{url}?per_page={PER_PAGE}")
    }
}

/// GitHub REST API client.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    permits: Semaphore,
    retry: RetryConfig,
    ancestry: Ancestry,
    checkouts: Checkouts,
}

impl GitHubClient {
    pub fn new(config: &Config, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|e| Error::Config(format!("GITHUB_TOKEN is invalid: {e}")))?;
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("bpaudit/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(GitHubClient {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            permits: Semaphore::new(config.max_concurrent_requests.max(1)),
            retry: config.retry.clone(),
            ancestry: config.ancestry,
            checkouts: Checkouts::new(config.checkout_dir(), &config.host),
        })
    }

    /// Replaces the checkout manager (e.g. to clone from a local mirror).
    pub fn with_checkouts(mut self, checkouts: Checkouts) -> Self {
        self.checkouts = checkouts;
        self
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.name)
    }

    /// API URL of a pull request given its web or API URL.
    pub fn pull_api_url(&self, url: &str) -> Result<String> {
        let id = PullRef::parse(url)?;
        Ok(format!("{}/pulls/{}", self.repo_url(&id.repo), id.number))
    }

    /// GET with retries. Only successful responses are returned.
    async fn send(&self, url: &str) -> Result<Response> {
        let mut backoff = Backoff::new(&self.retry);

        loop {
            let result = {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|e| bpaudit_core::Error::Host(e.to_string()))?;
                debug!("GET {}", url);
                self.http.get(url).send().await
            };

            let (reason, server_delay) = match result {
                Ok(response) => {
                    let status = response.status();
                    let remaining = response
                        .headers()
                        .get("x-ratelimit-remaining")
                        .and_then(|v| v.to_str().ok());
                    match classify(status, remaining) {
                        Disposition::Success => return Ok(response),
                        Disposition::NotFound => {
                            return Err(bpaudit_core::Error::PullRequestNotFound(url.to_string()).into())
                        }
                        Disposition::Fail => {
                            let body = response.text().await.unwrap_or_default();
                            return Err(bpaudit_core::Error::Host(format!(
                                "GET {url} failed with status {status}: {body}"
                            ))
                            .into());
                        }
                        Disposition::Retry => {
                            (format!("status {status}"), retry_after(response.headers()))
                        }
                    }
                }
                Err(e) if e.is_builder() => return Err(e.into()),
                Err(e) => (e.to_string(), None),
            };

            backoff.wait(&format!("GET {url}"), &reason, server_delay).await?;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(url).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// One page of a list endpoint plus the next page URL.
    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<(Vec<T>, Option<String>)> {
        let response = self.send(url).await?;
        let next = response
            .headers()
            .get(header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);
        let body = response.text().await?;
        Ok((serde_json::from_str(&body)?, next))
    }

    /// Every page of a list endpoint.
    async fn get_paginated<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(with_per_page(url));
        while let Some(url) = next {
            let (page, following) = self.get_page(&url).await?;
            items.extend(page);
            next = following;
        }
        Ok(items)
    }

    pub async fn pull(&self, url: &str) -> Result<PullRequest> {
        let api: ApiPull = self.get_json(&self.pull_api_url(url)?).await?;
        Ok(api.into_pull()?)
    }

    pub async fn comments(&self, pull: &PullRequest) -> Result<Vec<Comment>> {
        let url = format!("{}/issues/{}/comments", self.repo_url(pull.repo()), pull.id.number);
        let comments: Vec<ApiComment> = self.get_paginated(&url).await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    pub async fn timeline(&self, pull: &PullRequest) -> Result<Vec<TimelineEvent>> {
        let url = format!("{}/issues/{}/timeline", self.repo_url(pull.repo()), pull.id.number);
        let events: Vec<ApiTimelineEvent> = self.get_paginated(&url).await?;
        Ok(events.into_iter().map(TimelineEvent::from).collect())
    }

    pub async fn commit_pull_requests(&self, commit: &CommitRef) -> Result<Vec<PullRequest>> {
        let url = format!("{}/commits/{}/pulls", self.repo_url(&commit.repo), commit.sha);
        let pulls: Vec<ApiPull> = self.get_paginated(&url).await?;
        pulls
            .into_iter()
            .map(|p| p.into_pull().map_err(Error::from))
            .collect()
    }

    pub async fn commit_message(&self, commit: &CommitRef) -> Result<String> {
        let url = format!("{}/commits/{}", self.repo_url(&commit.repo), commit.sha);
        let api: ApiCommit = self.get_json(&url).await?;
        Ok(api.commit.message)
    }

    pub async fn branches(&self, repo: &RepoRef) -> Result<BTreeSet<String>> {
        let url = format!("{}/branches", self.repo_url(repo));
        let branches: Vec<ApiBranch> = self.get_paginated(&url).await?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    /// Returns true if `sha` appears in the commit list of `branch`.
    async fn branch_has_commit(&self, repo: &RepoRef, branch: &str, sha: &str) -> Result<bool> {
        let mut next = Some(with_per_page(&format!(
            "{}/commits?sha={}",
            self.repo_url(repo),
            branch
        )));
        while let Some(url) = next {
            let (page, following): (Vec<ApiCommitSummary>, _) = self.get_page(&url).await?;
            if page.iter().any(|c| c.sha == sha) {
                return Ok(true);
            }
            next = following;
        }
        Ok(false)
    }

    pub async fn branches_containing(&self, repo: &RepoRef, sha: &str) -> Result<BTreeSet<String>> {
        match self.ancestry {
            Ancestry::Checkout => self.checkouts.branches_containing(repo, sha).await,
            Ancestry::Api => {
                let mut found = BTreeSet::new();
                let branches = self.branches(repo).await?;
                for branch in branches
                    .iter()
                    .filter(|b| !BOT_BRANCH_MARKERS.iter().any(|m| b.contains(m)))
                {
                    if self.branch_has_commit(repo, branch, sha).await? {
                        found.insert(branch.clone());
                    }
                }
                Ok(found)
            }
        }
    }
}

impl CodeHost for GitHubClient {
    fn pull_request<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, bpaudit_core::Result<PullRequest>> {
        Box::pin(async move { Ok(self.pull(url).await?) })
    }

    fn comments<'a>(
        &'a self,
        pull: &'a PullRequest,
    ) -> BoxFuture<'a, bpaudit_core::Result<Vec<Comment>>> {
        Box::pin(async move { Ok(GitHubClient::comments(self, pull).await?) })
    }

    fn timeline<'a>(
        &'a self,
        pull: &'a PullRequest,
    ) -> BoxFuture<'a, bpaudit_core::Result<Vec<TimelineEvent>>> {
        Box::pin(async move { Ok(GitHubClient::timeline(self, pull).await?) })
    }

    fn commit_pull_requests<'a>(
        &'a self,
        commit: &'a CommitRef,
    ) -> BoxFuture<'a, bpaudit_core::Result<Vec<PullRequest>>> {
        Box::pin(async move { Ok(GitHubClient::commit_pull_requests(self, commit).await?) })
    }

    fn commit_message<'a>(
        &'a self,
        commit: &'a CommitRef,
    ) -> BoxFuture<'a, bpaudit_core::Result<String>> {
        Box::pin(async move { Ok(GitHubClient::commit_message(self, commit).await?) })
    }

    fn branches<'a>(
        &'a self,
        repo: &'a RepoRef,
    ) -> BoxFuture<'a, bpaudit_core::Result<BTreeSet<String>>> {
        Box::pin(async move { Ok(GitHubClient::branches(self, repo).await?) })
    }

    fn branches_containing<'a>(
        &'a self,
        repo: &'a RepoRef,
        sha: &'a str,
    ) -> BoxFuture<'a, bpaudit_core::Result<BTreeSet<String>>> {
        Box::pin(async move { Ok(GitHubClient::branches_containing(self, repo, sha).await?) })
    }

    fn development_version<'a>(
        &'a self,
        repo: &'a RepoRef,
    ) -> BoxFuture<'a, bpaudit_core::Result<String>> {
        Box::pin(async move { Ok(self.checkouts.development_version(repo).await?) })
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
