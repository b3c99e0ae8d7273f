// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Audit configuration.
//!
//! Configuration is read from a TOML file and covers:
//! - which repositories and branches are audited
//! - where the issue snapshot lives and how its fields are named
//! - how the code host is reached (retries, concurrency, ancestry strategy)
//!
//! Credentials are never stored here; they come from the environment.

use bpaudit_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};

/// Config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "bpaudit.toml";

/// Audit configuration, usually loaded from `bpaudit.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Code-host domain, e.g. `github.com`.
    pub host: String,
    /// Base URL of the code-host REST API.
    pub api_url: String,
    /// Substrings selecting tracked repositories.
    pub repos: Vec<String>,
    /// Substrings excluding pull-request URLs.
    pub exclude: Vec<String>,
    pub maintenance_prefix: String,
    pub done_states: Vec<String>,
    /// Logins containing this substring are backport automation.
    pub automation_login_marker: String,
    pub snapshot: SnapshotConfig,
    pub jira: JiraConfig,
    /// Directory holding cached clones. Defaults to the user cache dir.
    pub checkout_dir: Option<PathBuf>,
    pub ancestry: Ancestry,
    pub retry: RetryConfig,
    pub max_concurrent_requests: usize,
    pub request_timeout_secs: u64,
    /// Issues analysed concurrently.
    pub jobs: usize,
}

/// Where the issue snapshot lives and how its fields are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    /// Custom field holding the pull-request links.
    pub pr_field: String,
    pub issue_prefix: String,
}

/// Jira server used by `bpaudit snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JiraConfig {
    pub server: String,
    pub project: String,
    pub page_size: u32,
}

/// How branch ancestry of a merge commit is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ancestry {
    /// `git branch --contains` in a cached clone.
    #[default]
    Checkout,
    /// Walk each branch's commit list through the REST API.
    Api,
}

/// Retry policy for GitHub and Jira requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Config {
            host: engine.host,
            api_url: "https://api.github.com".to_string(),
            repos: engine.repos,
            exclude: engine.exclude,
            maintenance_prefix: engine.maintenance_prefix,
            done_states: engine.done_states,
            automation_login_marker: engine.automation_marker,
            snapshot: SnapshotConfig::default(),
            jira: JiraConfig::default(),
            checkout_dir: None,
            ancestry: Ancestry::default(),
            retry: RetryConfig::default(),
            max_concurrent_requests: 4,
            request_timeout_secs: 30,
            jobs: 4,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            path: PathBuf::from(".data/jiras.json"),
            pr_field: "customfield_12310220".to_string(),
            issue_prefix: "AAH".to_string(),
        }
    }
}

impl Default for JiraConfig {
    fn default() -> Self {
        JiraConfig {
            server: "https://issues.redhat.com".to_string(),
            project: "AAH".to_string(),
            page_size: 100,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_retries: 5,
            initial_delay_ms: 500,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }
}

impl Config {
    /// Loads configuration.
    ///
    /// Lookup order: `explicit`, then `BPAUDIT_CONFIG`, then `bpaudit.toml`
    /// in the current directory, then built-in defaults. An explicitly named
    /// file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env::config_path() {
            return Self::from_file(&path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        Ok(Config::default())
    }

    /// Reads and validates a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses and validates TOML config text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host cannot be empty".to_string()));
        }
        if self.maintenance_prefix.is_empty() {
            return Err(Error::Config(
                "maintenance_prefix cannot be empty".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }
        if self.max_concurrent_requests == 0 {
            return Err(Error::Config(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.jira.page_size == 0 {
            return Err(Error::Config("jira.page_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Engine policy derived from this configuration.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            host: self.host.clone(),
            repos: self.repos.clone(),
            exclude: self.exclude.clone(),
            maintenance_prefix: self.maintenance_prefix.clone(),
            done_states: self.done_states.iter().map(|s| s.to_lowercase()).collect(),
            automation_marker: self.automation_login_marker.clone(),
        }
    }

    /// Directory holding cached repository clones.
    pub fn checkout_dir(&self) -> PathBuf {
        self.checkout_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("bpaudit")
                .join("checkouts")
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
