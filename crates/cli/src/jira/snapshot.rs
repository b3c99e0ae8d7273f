// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reads the locally cached array of raw Jira issues.

use bpaudit_core::{sort_issues, Issue};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use tracing::{debug, info};

use crate::config::SnapshotConfig;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RawIssue {
    fn into_issue(self, pr_field: &str) -> Issue {
        let status = self
            .fields
            .get("status")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let fix_versions = self
            .fields
            .get("fixVersions")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|v| v.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        Issue {
            id: self.key,
            status,
            fix_versions,
            pull_requests: pull_request_links(self.fields.get(pr_field)),
        }
    }
}

/// Links from the pull-request custom field: an array of URLs, or a single
/// string with whitespace- or comma-separated URLs.
fn pull_request_links(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Parses snapshot JSON into issues, newest first.
///
/// Issues whose key lacks the configured project prefix are dropped.
pub fn parse_snapshot(content: &str, config: &SnapshotConfig) -> Result<Vec<Issue>> {
    let raw: Vec<RawIssue> = serde_json::from_str(content)?;
    let prefix = format!("{}-", config.issue_prefix);
    let mut issues: Vec<Issue> = raw
        .into_iter()
        .filter(|r| {
            let keep = r.key.starts_with(&prefix);
            if !keep {
                debug!("skipping {}: not a {} issue", r.key, config.issue_prefix);
            }
            keep
        })
        .map(|r| r.into_issue(&config.pr_field))
        .collect();
    sort_issues(&mut issues);
    Ok(issues)
}

/// Loads the snapshot file, optionally narrowed to a single issue key.
pub fn load(config: &SnapshotConfig, only: Option<&str>) -> Result<Vec<Issue>> {
    if !config.path.is_file() {
        return Err(Error::SnapshotNotFound(config.path.display().to_string()));
    }
    let content = fs::read_to_string(&config.path)?;
    let mut issues = parse_snapshot(&content, config)?;
    info!("loaded {} issues from {}", issues.len(), config.path.display());

    if let Some(key) = only {
        issues.retain(|i| i.id == key);
    }
    Ok(issues)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
