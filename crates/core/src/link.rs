// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Link resolution: backport and successor relations between pull requests.
//!
//! Backport links are merged from three independent extractors over the same
//! [`Evidence`] bundle (automation comments, cross-references, and commit
//! references); successor links come from a scan of human comments. All
//! extractors are pure, so the result does not depend on fetch order.

use std::collections::BTreeSet;
use tracing::debug;

use crate::host::{CommitPull, Evidence};
use crate::pull::{canonical_url, Comment, PullRef, PullRequest, TimelineEvent};

/// Phrases that mark a comment line as pointing at a replacement.
const SUCCESSOR_PHRASES: [&str; 4] = [
    "reopening this here",
    "deprecated by",
    "in favor of",
    "in favour of",
];

/// Phrase automation bots use when they open a backport.
const BACKPORTED_AS: &str = "Backported as";

/// Policy values link resolution depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRules {
    /// Code-host domain (e.g. "github.com").
    pub host: String,
    /// Case-sensitive substring identifying backport automation logins.
    pub automation_marker: String,
    /// Prefix of maintenance branch names (e.g. "stable-").
    pub maintenance_prefix: String,
}

impl Default for LinkRules {
    fn default() -> Self {
        LinkRules {
            host: "github.com".to_string(),
            automation_marker: "patch".to_string(),
            maintenance_prefix: "stable-".to_string(),
        }
    }
}

impl LinkRules {
    /// URLs of pull requests that are backports of `pull`.
    ///
    /// A pull request opened directly against a maintenance branch is its
    /// own backport, so its own URL is included.
    pub fn backport_links(&self, pull: &PullRequest, evidence: &Evidence) -> BTreeSet<String> {
        let mut links = self.comment_links(&evidence.comments);
        links.extend(self.cross_reference_links(pull, &evidence.events));
        links.extend(self.commit_reference_links(pull, evidence));
        if pull.targets_maintenance(&self.maintenance_prefix) {
            links.insert(canonical_url(&pull.html_url, &self.host));
        }
        links
    }

    /// Links announced by backport automation ("Backported as <url>").
    pub fn comment_links(&self, comments: &[Comment]) -> BTreeSet<String> {
        comments
            .iter()
            .filter(|c| c.author.contains(&self.automation_marker))
            .filter(|c| {
                c.body
                    .to_lowercase()
                    .contains(&BACKPORTED_AS.to_lowercase())
            })
            .filter_map(|c| {
                c.body
                    .lines()
                    .find(|line| line.starts_with(BACKPORTED_AS))
                    .and_then(|line| line.split_whitespace().last())
            })
            .map(|token| canonical_url(token, &self.host))
            .collect()
    }

    /// Same-repository issues or pull requests that cross-referenced `pull`.
    pub fn cross_reference_links(
        &self,
        pull: &PullRequest,
        events: &[TimelineEvent],
    ) -> BTreeSet<String> {
        events
            .iter()
            .filter_map(|event| match event {
                TimelineEvent::CrossReferenced { source_url } => PullRef::parse(source_url).ok(),
                _ => None,
            })
            .filter(|source| source.repo.same_as(pull.repo()))
            .map(|source| source.html_url(&self.host))
            .collect()
    }

    /// Same-repository pull requests reached through referencing commits
    /// that are recognizably backports of `pull`.
    pub fn commit_reference_links(
        &self,
        pull: &PullRequest,
        evidence: &Evidence,
    ) -> BTreeSet<String> {
        evidence
            .commit_references
            .iter()
            .flat_map(|reference| reference.pulls.iter())
            .filter_map(|candidate| {
                let candidate_ref = PullRef::parse(&candidate.url).ok()?;
                if !candidate_ref.repo.same_as(pull.repo()) {
                    return None;
                }
                if is_titled_backport(candidate, pull) || is_cherry_pick_of(candidate, pull) {
                    debug!("accepted backport candidate {}", candidate.url);
                    Some(candidate_ref.html_url(&self.host))
                } else {
                    debug!("rejected backport candidate {}", candidate.url);
                    None
                }
            })
            .collect()
    }

    /// Candidate replacement URLs for a pull request closed without merge.
    ///
    /// Deduplicated, in order of first appearance. Choosing between several
    /// candidates is left to the caller.
    pub fn successor_links(&self, comments: &[Comment]) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut links = Vec::new();
        for line in comments.iter().flat_map(|c| c.body.lines()) {
            if !line.contains(&self.host) {
                continue;
            }
            let lowered = line.to_lowercase();
            if !SUCCESSOR_PHRASES.iter().any(|p| lowered.contains(p)) {
                continue;
            }
            for token in line.split_whitespace().filter(|t| t.contains(&self.host)) {
                let url = canonical_url(token, &self.host);
                if seen.insert(url.to_lowercase()) {
                    links.push(url);
                }
            }
        }
        links
    }
}

/// "Backport #123 to 4.3"-style titles.
fn is_titled_backport(candidate: &CommitPull, pull: &PullRequest) -> bool {
    candidate.title.to_lowercase().contains("backport")
        && candidate.title.contains(&pull.id.number.to_string())
}

/// Candidate's merge commit is a `cherry-pick -x` of `pull`'s merge commit.
fn is_cherry_pick_of(candidate: &CommitPull, pull: &PullRequest) -> bool {
    let (Some(message), Some(merge_commit)) = (&candidate.merge_commit_message, &pull.merge_commit)
    else {
        return false;
    };
    message.contains("cherry") && cherry_pick_source(message) == Some(merge_commit.as_str())
}

/// Source sha from a trailing "(cherry picked from commit <sha>)" line.
pub fn cherry_pick_source(message: &str) -> Option<&str> {
    message
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())?
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|token| !token.is_empty())
        .last()
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
