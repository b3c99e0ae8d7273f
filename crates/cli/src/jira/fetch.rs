// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pages through the Jira search API and writes the local snapshot.
//!
//! This is read-only against the tracker; the only write is the snapshot
//! file itself. Searches share the GitHub client's retry policy.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{JiraConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::{classify, retry_after, Backoff, Disposition};

/// One page of `/rest/api/2/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Value>,
}

impl SearchPage {
    /// `startAt` of the following page, if any.
    pub fn next_start(&self) -> Option<u32> {
        if self.issues.is_empty() {
            return None;
        }
        let next = self.start_at.saturating_add(self.issues.len() as u32);
        (next < self.total).then_some(next)
    }
}

/// Jira REST client authenticated with a personal access token.
pub struct JiraClient {
    http: Client,
    server: String,
    project: String,
    page_size: u32,
    retry: RetryConfig,
}

impl JiraClient {
    pub fn new(
        config: &JiraConfig,
        token: &str,
        timeout: Duration,
        retry: &RetryConfig,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::Config(format!("JIRA_TOKEN is invalid: {e}")))?;
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bpaudit/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(JiraClient {
            http,
            server: config.server.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            page_size: config.page_size,
            retry: retry.clone(),
        })
    }

    pub fn jql(&self) -> String {
        format!("project = {} ORDER BY created DESC", self.project)
    }

    async fn search(&self, start_at: u32) -> Result<SearchPage> {
        let url = format!("{}/rest/api/2/search", self.server);
        let mut backoff = Backoff::new(&self.retry);

        loop {
            debug!("GET {} startAt={}", url, start_at);
            let result = self
                .http
                .get(&url)
                .query(&[
                    ("jql", self.jql()),
                    ("startAt", start_at.to_string()),
                    ("maxResults", self.page_size.to_string()),
                ])
                .send()
                .await;

            let (reason, server_delay) = match result {
                Ok(response) => {
                    let status = response.status();
                    match classify(status, None) {
                        Disposition::Success => {
                            let body = response.text().await?;
                            return Ok(serde_json::from_str(&body)?);
                        }
                        Disposition::Retry => {
                            (format!("status {status}"), retry_after(response.headers()))
                        }
                        Disposition::NotFound | Disposition::Fail => {
                            let body = response.text().await.unwrap_or_default();
                            return Err(Error::Jira(format!(
                                "search failed with status {status}: {body}"
                            )));
                        }
                    }
                }
                Err(e) if e.is_builder() => return Err(e.into()),
                Err(e) => (e.to_string(), None),
            };

            backoff
                .wait(&format!("GET {url} startAt={start_at}"), &reason, server_delay)
                .await?;
        }
    }

    /// Every raw issue in the project, newest first, deduplicated by key.
    pub async fn fetch_all(&self) -> Result<Vec<Value>> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut start = Some(0);

        while let Some(start_at) = start {
            let page = self.search(start_at).await?;
            start = page.next_start();
            info!("fetched {} of {} issues", start_at as usize + page.issues.len(), page.total);
            for issue in page.issues {
                let key = issue.get("key").and_then(Value::as_str).map(str::to_string);
                match key {
                    Some(key) if seen.insert(key.clone()) => issues.push(issue),
                    Some(_) => {}
                    None => debug!("skipping issue without key"),
                }
            }
        }
        Ok(issues)
    }
}

/// Writes issues as pretty JSON, creating parent directories.
pub fn write_snapshot(path: &Path, issues: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(issues)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
