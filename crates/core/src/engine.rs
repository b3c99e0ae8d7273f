// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation of declared fix versions against observed backports.
//!
//! For every auditable issue the [`Reconciler`] resolves each referenced
//! pull request (following a single successor when one was closed without
//! merge), works out which release lines already carry the fix, maps the
//! backport pull requests by target branch, and reports every mismatch as a
//! [`Diagnostic`]. Ambiguity is reported, never resolved by guessing.

use futures_util::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::{Error, Result};
use crate::host::{collect_evidence, CodeHost};
use crate::issue::Issue;
use crate::link::LinkRules;
use crate::pull::{PullRef, PullRequest, RepoRef};
use crate::version;

/// Label prefix requesting a backport ("backport-4.3").
pub const REQUEST_LABEL_PREFIX: &str = "backport-";
/// Label prefix automation sets once a backport was opened ("backported-4.3").
pub const DONE_LABEL_PREFIX: &str = "backported-";

/// Policy the engine applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Code-host domain pull-request URLs must contain.
    pub host: String,
    /// Substrings selecting tracked repositories. Empty tracks everything.
    pub repos: Vec<String>,
    /// Substrings excluding URLs (e.g. an importer repository).
    pub exclude: Vec<String>,
    pub maintenance_prefix: String,
    /// Lower-cased workflow states that mean "done".
    pub done_states: Vec<String>,
    /// Substring identifying backport automation logins.
    pub automation_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let rules = LinkRules::default();
        EngineConfig {
            host: rules.host,
            repos: vec!["galaxy".to_string(), "hub-ui".to_string()],
            exclude: vec!["importer".to_string()],
            maintenance_prefix: rules.maintenance_prefix,
            done_states: vec![
                "done".to_string(),
                "ready for qa".to_string(),
                "in qa".to_string(),
            ],
            automation_marker: rules.automation_marker,
        }
    }
}

impl EngineConfig {
    /// Returns true if `url` belongs to a tracked repository.
    pub fn tracks(&self, url: &str) -> bool {
        url.contains(&self.host)
            && (self.repos.is_empty() || self.repos.iter().any(|r| url.contains(r.as_str())))
            && !self.exclude.iter().any(|x| url.contains(x.as_str()))
    }

    /// Returns true if a lower-cased status counts as done.
    pub fn is_done(&self, status_key: &str) -> bool {
        self.done_states.iter().any(|s| s == status_key)
    }

    pub fn link_rules(&self) -> LinkRules {
        LinkRules {
            host: self.host.clone(),
            automation_marker: self.automation_marker.clone(),
            maintenance_prefix: self.maintenance_prefix.clone(),
        }
    }
}

/// One backport pull request observed for a source pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackportRecord {
    /// Target branch with the maintenance prefix stripped.
    pub branch: String,
    /// Pull request being backported.
    pub source: String,
    /// The backporting pull request.
    pub backport: String,
    pub author: String,
    /// Taken from the backporting pull request's own state.
    pub merged: bool,
    /// The branch is one of the issue's declared fix versions.
    pub expected: bool,
}

/// The pull request analysis continues with, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePull {
    /// The referenced pull request (in `Superseded` state when redirected).
    /// Kept for diagnostic messages.
    pub original: PullRequest,
    /// The pull request every later step looks at.
    pub effective: PullRequest,
}

impl EffectivePull {
    fn direct(pull: PullRequest) -> Self {
        EffectivePull {
            original: pull.clone(),
            effective: pull,
        }
    }

    pub fn is_redirected(&self) -> bool {
        !self.original.id.same_as(&self.effective.id)
    }
}

/// Everything computed for one referenced pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullAnalysis {
    /// URL as referenced by the issue.
    pub url: String,
    /// URL of the pull request analysed (differs when superseded).
    pub effective_url: String,
    pub merged: bool,
    pub backports_expected: BTreeSet<String>,
    pub backports_requested: BTreeSet<String>,
    pub backported_to: BTreeSet<String>,
    /// Requested but never labelled as backported.
    pub backports_failed: BTreeSet<String>,
    /// Expected but never requested.
    // TODO: report as its own diagnostic kind.
    pub backports_missed: BTreeSet<String>,
    /// Normalized version of the development branch.
    pub trunk_version: Option<String>,
    /// Release lines whose branches already contain the merge commit.
    pub merged_into: BTreeSet<String>,
    /// Every expected version was already in `merged_into`.
    pub fully_satisfied: bool,
    pub backports: BTreeMap<String, Vec<BackportRecord>>,
}

/// Result of auditing one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReport {
    pub issue: String,
    pub pulls: Vec<PullAnalysis>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Flattens reports into diagnostics, keeping issue order.
pub fn collect_diagnostics(reports: Vec<IssueReport>) -> Vec<Diagnostic> {
    reports.into_iter().flat_map(|r| r.diagnostics).collect()
}

/// Audits issues against a code host.
pub struct Reconciler<'h> {
    host: &'h dyn CodeHost,
    config: EngineConfig,
    rules: LinkRules,
}

impl<'h> Reconciler<'h> {
    pub fn new(host: &'h dyn CodeHost, config: EngineConfig) -> Self {
        let rules = config.link_rules();
        Reconciler {
            host,
            config,
            rules,
        }
    }

    /// Audits `issues`, up to `jobs` at a time.
    ///
    /// Reports come back in input order. A pull request that cannot be found
    /// or analysed becomes a diagnostic. Only exhausted retries
    /// ([`Error::Transient`]) abort the run.
    pub async fn run(&self, issues: &[Issue], jobs: usize) -> Result<Vec<IssueReport>> {
        stream::iter(issues)
            .map(|issue| self.analyze_issue(issue))
            .buffered(jobs.max(1))
            .try_collect()
            .await
    }

    /// Audits a single issue.
    pub async fn analyze_issue(&self, issue: &Issue) -> Result<IssueReport> {
        let mut sink = DiagnosticSink::new(&issue.id);
        let mut pulls = Vec::new();

        if issue.is_auditable() {
            info!("{}", issue.id);
            for label in &issue.fix_versions {
                debug!("{} fix version {}", issue.id, label);
            }

            let expected = issue.expected_versions();
            for url in issue.pull_requests.iter().filter(|u| self.config.tracks(u)) {
                match self.analyze_pull(issue, url, &expected, &mut sink).await {
                    Ok(Some(analysis)) => pulls.push(analysis),
                    Ok(None) => {}
                    Err(e @ Error::Transient(_)) => return Err(e),
                    Err(e) => {
                        warn!("{} {}: {}", issue.id, url, e);
                        sink.emit(
                            DiagnosticKind::HostError,
                            format!("{} could not analyse pull request {}: {}", issue.id, url, e),
                        );
                    }
                }
            }
        }

        Ok(IssueReport {
            issue: issue.id.clone(),
            pulls,
            diagnostics: sink.into_vec(),
        })
    }

    async fn analyze_pull(
        &self,
        issue: &Issue,
        url: &str,
        expected: &BTreeSet<String>,
        sink: &mut DiagnosticSink,
    ) -> Result<Option<PullAnalysis>> {
        let Some(pull) = self.fetch(url).await? else {
            sink.emit(
                DiagnosticKind::PullRequestNotFound,
                format!("{} could not find pull request {}", issue.id, url),
            );
            return Ok(None);
        };

        let Some(resolved) = self.resolve_successor(issue, pull, sink).await? else {
            return Ok(None);
        };
        if resolved.is_redirected() {
            let (original, successor) = (&resolved.original, &resolved.effective);
            sink.emit(
                DiagnosticKind::Superseded,
                format!(
                    "{} links to {} [{}] which was deprecated by {} [{}]",
                    issue.id, original.html_url, original.author, successor.html_url, successor.author
                ),
            );
        }
        let pull = &resolved.effective;

        let status = issue.status_key();
        let done = self.config.is_done(&status);
        if done && !pull.is_merged() {
            sink.emit(
                DiagnosticKind::DoneButNotMerged,
                format!(
                    "{} is marked as \"{}\" when {} [{}] is not merged",
                    issue.id, status, pull.html_url, pull.author
                ),
            );
        }
        info!("{} {} {}", url, pull.base_branch, pull.state);

        let backports_requested = pull.labels_with_prefix(REQUEST_LABEL_PREFIX);
        let backported_to = pull.labels_with_prefix(DONE_LABEL_PREFIX);
        let backports_failed = backports_requested
            .difference(&backported_to)
            .cloned()
            .collect();
        let backports_missed = expected.difference(&backports_requested).cloned().collect();

        let trunk_version = self.trunk_version(pull.repo()).await?;
        let merged_into = if pull.is_merged() {
            self.merged_into(pull, trunk_version.as_deref()).await?
        } else {
            BTreeSet::new()
        };

        let mut analysis = PullAnalysis {
            url: url.to_string(),
            effective_url: pull.html_url.clone(),
            merged: pull.is_merged(),
            backports_expected: expected.clone(),
            backports_requested,
            backported_to,
            backports_failed,
            backports_missed,
            trunk_version,
            merged_into,
            fully_satisfied: false,
            backports: BTreeMap::new(),
        };

        if !expected.is_empty()
            && !analysis.merged_into.is_empty()
            && expected.is_subset(&analysis.merged_into)
        {
            debug!("{} already contained in {:?}", pull.html_url, analysis.merged_into);
            analysis.fully_satisfied = true;
            return Ok(Some(analysis));
        }

        analysis.backports = self.backport_records(issue, pull, expected, sink).await?;
        self.check_versions(issue, pull, &analysis, done, sink);

        Ok(Some(analysis))
    }

    /// Fetches a pull request, mapping "not found" to `None`.
    async fn fetch(&self, url: &str) -> Result<Option<PullRequest>> {
        match self.host.pull_request(url).await {
            Ok(pull) => Ok(Some(pull)),
            Err(e) if e.is_not_found() => {
                debug!("{}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Follows a closed-unmerged pull request to its single successor.
    ///
    /// Returns `None` when analysis of this link stops.
    async fn resolve_successor(
        &self,
        issue: &Issue,
        pull: PullRequest,
        sink: &mut DiagnosticSink,
    ) -> Result<Option<EffectivePull>> {
        if !pull.is_closed_unmerged() {
            return Ok(Some(EffectivePull::direct(pull)));
        }

        let comments = self.host.comments(&pull).await?;
        let links: Vec<String> = self
            .rules
            .successor_links(&comments)
            .into_iter()
            .filter(|link| !refers_to(link, &pull.id))
            .collect();

        let mut candidates = Vec::new();
        for link in &links {
            match self.fetch(link).await? {
                Some(candidate) => candidates.push(candidate),
                None => warn!("{} successor candidate {} not found", issue.id, link),
            }
        }

        if candidates.len() > 1 {
            let urls: Vec<&str> = candidates.iter().map(|c| c.html_url.as_str()).collect();
            sink.emit(
                DiagnosticKind::AmbiguousSuccessors,
                format!(
                    "{} links to {} [{}] which was closed without merge and has multiple successors: {}",
                    issue.id,
                    pull.html_url,
                    pull.author,
                    urls.join(", ")
                ),
            );
            return Ok(None);
        }

        match candidates.pop() {
            Some(successor) => Ok(Some(EffectivePull {
                original: pull.superseded()?,
                effective: successor,
            })),
            None => {
                sink.emit(
                    DiagnosticKind::ClosedWithoutMerge,
                    format!(
                        "{} links to {} [{}] which was closed without merge",
                        issue.id, pull.html_url, pull.author
                    ),
                );
                Ok(None)
            }
        }
    }

    /// Normalized development-branch version, if it can be determined.
    async fn trunk_version(&self, repo: &RepoRef) -> Result<Option<String>> {
        match self.host.development_version(repo).await {
            Ok(raw) => Ok(version::normalize(&raw)),
            Err(e @ Error::Transient(_)) => Err(e),
            Err(e) => {
                warn!("development version of {} unknown: {}", repo, e);
                Ok(None)
            }
        }
    }

    /// Release lines already carrying the merge commit, trunk included.
    async fn merged_into(
        &self,
        pull: &PullRequest,
        trunk_version: Option<&str>,
    ) -> Result<BTreeSet<String>> {
        let mut versions = BTreeSet::new();
        if let Some(sha) = &pull.merge_commit {
            let branches = match self.host.branches_containing(pull.repo(), sha).await {
                Ok(branches) => branches,
                Err(e) if e.is_not_found() => BTreeSet::new(),
                Err(e) => return Err(e),
            };
            versions.extend(
                branches
                    .iter()
                    .filter_map(|b| b.strip_prefix(self.config.maintenance_prefix.as_str()))
                    .filter_map(version::normalize),
            );
        }
        versions.extend(trunk_version.map(str::to_string));
        Ok(versions)
    }

    /// Resolves backport links and groups them by target branch.
    async fn backport_records(
        &self,
        issue: &Issue,
        pull: &PullRequest,
        expected: &BTreeSet<String>,
        sink: &mut DiagnosticSink,
    ) -> Result<BTreeMap<String, Vec<BackportRecord>>> {
        let evidence = collect_evidence(self.host, pull).await?;
        let links = self.rules.backport_links(pull, &evidence);

        let mut records: BTreeMap<String, Vec<BackportRecord>> = BTreeMap::new();
        for link in &links {
            let backport = if refers_to(link, &pull.id) {
                pull.clone()
            } else {
                match self.fetch(link).await? {
                    Some(backport) => backport,
                    None => {
                        sink.emit(
                            DiagnosticKind::PullRequestNotFound,
                            format!("{} could not find pull request {}", issue.id, link),
                        );
                        continue;
                    }
                }
            };

            let branch = backport
                .target_branch(&self.config.maintenance_prefix)
                .to_string();
            debug!("{} backport {} -> {}", pull.html_url, backport.html_url, branch);
            records
                .entry(branch.clone())
                .or_default()
                .push(BackportRecord {
                    expected: expected.contains(&branch),
                    branch,
                    source: pull.html_url.clone(),
                    backport: backport.html_url.clone(),
                    author: backport.author.clone(),
                    merged: backport.is_merged(),
                });
        }
        Ok(records)
    }

    /// Compares declared and requested versions against the backport map.
    fn check_versions(
        &self,
        issue: &Issue,
        pull: &PullRequest,
        analysis: &PullAnalysis,
        done: bool,
        sink: &mut DiagnosticSink,
    ) {
        let expected = &analysis.backports_expected;
        let versions: BTreeSet<&String> = expected
            .iter()
            .chain(analysis.backports_requested.iter())
            .collect();

        for v in versions {
            let Some(records) = analysis.backports.get(v) else {
                if expected.contains(v) && analysis.trunk_version.as_ref() != Some(v) {
                    sink.emit(
                        DiagnosticKind::MissingBackport,
                        format!(
                            "{} has a fix version of {} but no related backport PR for {} [{}]",
                            issue.id, v, pull.html_url, pull.author
                        ),
                    );
                }
                continue;
            };

            if !expected.contains(v) {
                if let Some(first) = records.first() {
                    sink.emit(
                        DiagnosticKind::UndeclaredBackport,
                        format!(
                            "{} has no fix version for {} but was backported to {} in {}",
                            issue.id, v, v, first.backport
                        ),
                    );
                }
            }

            if pull.is_merged() && !expected.is_empty() && done && !records.iter().any(|r| r.merged)
            {
                sink.emit(
                    DiagnosticKind::NoMergedBackport,
                    format!(
                        "{} has no merged backports for {} [{}] to {} but is in a \"{}\" state",
                        issue.id,
                        pull.html_url,
                        pull.author,
                        v,
                        issue.status_key()
                    ),
                );
            }
        }
    }
}

/// True if `url` parses to the pull request `id`.
fn refers_to(url: &str, id: &PullRef) -> bool {
    PullRef::parse(url).is_ok_and(|r| r.same_as(id))
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
