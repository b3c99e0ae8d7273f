// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cached local clones used for branch ancestry and version detection.
//!
//! Each repository is cloned once into `<root>/<owner>.<name>` and fetched
//! at most once per run.

use bpaudit_core::RepoRef;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

const REMOTE_PREFIX: &str = "remotes/origin/";

/// Manages local clones under a root directory.
pub struct Checkouts {
    root: PathBuf,
    /// Clone URL prefix, e.g. `https://github.com`.
    remote_base: String,
    /// Repositories cloned or fetched during this run.
    fresh: Mutex<BTreeSet<RepoRef>>,
}

impl Checkouts {
    pub fn new(root: impl Into<PathBuf>, host: &str) -> Self {
        Checkouts {
            root: root.into(),
            remote_base: format!("https://{host}"),
            fresh: Mutex::new(BTreeSet::new()),
        }
    }

    /// Clones from `<base>/<owner>/<name>` instead of the code host.
    pub fn with_remote_base(mut self, base: impl Into<String>) -> Self {
        self.remote_base = base.into();
        self
    }

    pub fn path_for(&self, repo: &RepoRef) -> PathBuf {
        self.root.join(format!("{}.{}", repo.owner, repo.name))
    }

    /// Returns an up-to-date clone of `repo`.
    pub async fn ensure(&self, repo: &RepoRef) -> Result<PathBuf> {
        let dir = self.path_for(repo);
        let mut fresh = self.fresh.lock().await;
        if fresh.contains(repo) {
            return Ok(dir);
        }

        if dir.join(".git").is_dir() {
            debug!("fetch {}", dir.display());
            git(&dir, &["fetch", "--prune", "--quiet", "origin"]).await?;
        } else {
            tokio::fs::create_dir_all(&self.root).await?;
            let url = format!("{}/{}/{}", self.remote_base, repo.owner, repo.name);
            info!("clone {} into {}", url, dir.display());
            let target = dir.to_string_lossy();
            git(&self.root, &["clone", "--quiet", &url, &target]).await?;
        }

        fresh.insert(repo.clone());
        Ok(dir)
    }

    /// Remote branches whose history contains `sha`.
    ///
    /// A sha unknown to the clone yields an empty set.
    pub async fn branches_containing(&self, repo: &RepoRef, sha: &str) -> Result<BTreeSet<String>> {
        let dir = self.ensure(repo).await?;
        match git(&dir, &["branch", "-a", "--contains", sha]).await {
            Ok(output) => Ok(parse_branch_contains(&output)),
            Err(Error::Git { stderr, .. }) if is_unknown_commit(&stderr) => {
                debug!("{} unknown in {}: {}", sha, repo, stderr.trim());
                Ok(BTreeSet::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Raw version string of the checked-out development branch.
    ///
    /// Tried in order: `setup.py`, `<name>/__init__.py`, `git describe`.
    pub async fn development_version(&self, repo: &RepoRef) -> Result<String> {
        let dir = self.ensure(repo).await?;

        if let Some(version) = read_version(&dir.join("setup.py"), parse_setup_version).await {
            return Ok(version);
        }
        let init = dir.join(&repo.name).join("__init__.py");
        if let Some(version) = read_version(&init, parse_init_version).await {
            return Ok(version);
        }

        let described = git(&dir, &["describe", "--always", "--match", "v*"]).await?;
        Ok(describe_to_version(&described))
    }
}

async fn read_version(path: &Path, parse: fn(&str) -> Option<String>) -> Option<String> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    parse(&content)
}

/// Runs git in `dir`, returning stdout.
async fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::Git {
            command: args.first().copied().unwrap_or_default().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn is_unknown_commit(stderr: &str) -> bool {
    stderr.contains("malformed object name") || stderr.contains("no such commit")
}

/// Parses `git branch -a --contains` output into remote branch names.
pub fn parse_branch_contains(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.contains("->"))
        .filter_map(|line| line.strip_prefix(REMOTE_PREFIX))
        .map(str::to_string)
        .collect()
}

fn unquote(token: &str) -> String {
    token
        .trim_end_matches(',')
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect()
}

/// Version from a `version = "…"` line in `setup.py`.
pub fn parse_setup_version(content: &str) -> Option<String> {
    let line = content.lines().find(|l| l.starts_with("version ="))?;
    let version = unquote(line.split_whitespace().last()?);
    (!version.is_empty()).then_some(version)
}

/// Version from a `__version__ = "…"` line.
pub fn parse_init_version(content: &str) -> Option<String> {
    let line = content.lines().find(|l| l.contains("__version__"))?;
    let version = unquote(line.split_whitespace().last()?);
    (!version.is_empty() && !version.contains("__version__")).then_some(version)
}

/// Converts `git describe` output to a version.
///
/// `v4.4.0-12-gabc` becomes `4.4.0.dev12+gabc`; a bare tag loses its `v`;
/// a bare sha becomes `0.0.0.dev0+<sha>`.
pub fn describe_to_version(described: &str) -> String {
    let described = described.trim();
    let tag = described.trim_start_matches('v');
    if described.contains('-') {
        let mut chunks = tag.rsplitn(3, '-');
        if let (Some(sha), Some(distance), Some(base)) = (chunks.next(), chunks.next(), chunks.next()) {
            return format!("{base}.dev{distance}+{sha}");
        }
        return tag.to_string();
    }
    if described.contains('.') {
        return tag.to_string();
    }
    format!("0.0.0.dev0+{described}")
}

#[cfg(test)]
#[path = "checkout_tests.rs"]
mod tests;
