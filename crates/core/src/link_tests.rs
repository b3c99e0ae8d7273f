// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::host::CommitReference;
use crate::pull::RepoRef;
use crate::test_helpers::{commit, merged_pull, pull, url};
use yare::parameterized;

fn rules() -> LinkRules {
    LinkRules::default()
}

fn candidate(number: u64, title: &str, message: Option<&str>) -> CommitPull {
    CommitPull {
        url: url(number),
        title: title.to_string(),
        merge_commit_message: message.map(str::to_string),
    }
}

fn evidence_with_candidates(pulls: Vec<CommitPull>) -> Evidence {
    Evidence {
        commit_references: vec![CommitReference {
            commit: commit("beef"),
            pulls,
        }],
        ..Default::default()
    }
}

#[test]
fn comment_links_from_automation() {
    let comments = vec![
        Comment::new(
            "patchback[bot]",
            "**Backport to stable-4.3**: 💚 backport PR created 💚\n\nBackported as https://github.com/ansible/galaxy_ng/pull/20\n\n🤖 @patchback",
        ),
        Comment::new("someone", "Backported as https://github.com/ansible/galaxy_ng/pull/21"),
        Comment::new("patchback[bot]", "backport failed, please do it manually"),
    ];
    let links: Vec<String> = rules().comment_links(&comments).into_iter().collect();
    assert_eq!(links, vec![url(20)]);
}

#[test]
fn comment_links_use_first_matching_line_only() {
    let comments = vec![Comment::new(
        "patchback[bot]",
        "Backported as https://github.com/ansible/galaxy_ng/pull/20\nBackported as https://github.com/ansible/galaxy_ng/pull/30",
    )];
    let links: Vec<String> = rules().comment_links(&comments).into_iter().collect();
    assert_eq!(links, vec![url(20)]);
}

#[test]
fn comment_links_marker_is_case_sensitive() {
    let comments = vec![Comment::new(
        "PatchBot",
        "Backported as https://github.com/ansible/galaxy_ng/pull/20",
    )];
    assert!(rules().comment_links(&comments).is_empty());
}

#[test]
fn cross_reference_links_same_repo_only() {
    let events = vec![
        TimelineEvent::CrossReferenced {
            source_url: "https://github.com/ansible/galaxy_ng/issues/30".into(),
        },
        TimelineEvent::CrossReferenced {
            source_url: "https://github.com/ansible/other/pull/31".into(),
        },
        TimelineEvent::Other {
            kind: "labeled".into(),
        },
    ];
    let links: Vec<String> = rules()
        .cross_reference_links(&pull(10), &events)
        .into_iter()
        .collect();
    assert_eq!(links, vec!["https://github.com/ansible/galaxy_ng/pull/30".to_string()]);
}

#[parameterized(
    titled = { "Backport #10 to stable-4.3", None, true },
    titled_lowercase = { "[4.3] backport of 10", None, true },
    titled_wrong_number = { "Backport #11", None, false },
    untitled = { "Fix the thing (#10)", None, false },
    cherry_pick = { "[4.3] Fix", Some("Fix\n\n(cherry picked from commit abc123)"), true },
    cherry_pick_other = { "[4.3] Fix", Some("Fix\n\n(cherry picked from commit fff000)"), false },
    no_cherry_word = { "[4.3] Fix", Some("Fix\n\n(abc123)"), false },
)]
fn commit_reference_acceptance(title: &str, message: Option<&str>, accepted: bool) {
    let evidence = evidence_with_candidates(vec![candidate(20, title, message)]);
    let links = rules().commit_reference_links(&merged_pull(10, "abc123"), &evidence);
    assert_eq!(links.contains(&url(20)), accepted);
}

#[test]
fn commit_reference_rejects_other_repo() {
    let mut foreign = candidate(20, "Backport #10", None);
    foreign.url = PullRef::new(RepoRef::new("ansible", "other"), 20).html_url("github.com");
    let evidence = evidence_with_candidates(vec![foreign]);
    assert!(rules()
        .commit_reference_links(&merged_pull(10, "abc123"), &evidence)
        .is_empty());
}

#[test]
fn backport_links_union_and_self_target() {
    let mut source = merged_pull(10, "abc123");
    source.base_branch = "stable-4.3".into();
    let evidence = Evidence {
        comments: vec![Comment::new(
            "patchback[bot]",
            "Backported as https://github.com/ansible/galaxy_ng/pull/20",
        )],
        events: vec![TimelineEvent::CrossReferenced {
            source_url: "https://github.com/ansible/galaxy_ng/issues/20".into(),
        }],
        commit_references: vec![CommitReference {
            commit: commit("beef"),
            pulls: vec![candidate(21, "Backport #10", None)],
        }],
    };

    let links: Vec<String> = rules().backport_links(&source, &evidence).into_iter().collect();
    assert_eq!(links, vec![url(10), url(20), url(21)]);
}

#[test]
fn backport_links_are_order_independent() {
    let comments = vec![
        Comment::new("patchback[bot]", "Backported as https://github.com/ansible/galaxy_ng/pull/20"),
        Comment::new("patchback[bot]", "Backported as https://github.com/ansible/galaxy_ng/pull/21"),
    ];
    let events = vec![
        TimelineEvent::CrossReferenced {
            source_url: url(22),
        },
        TimelineEvent::CrossReferenced {
            source_url: url(20),
        },
    ];
    let forward = Evidence {
        comments: comments.clone(),
        events: events.clone(),
        commit_references: Vec::new(),
    };
    let reversed = Evidence {
        comments: comments.into_iter().rev().collect(),
        events: events.into_iter().rev().collect(),
        commit_references: Vec::new(),
    };

    let source = pull(10);
    let once = rules().backport_links(&source, &forward);
    assert_eq!(once, rules().backport_links(&source, &reversed));
    assert_eq!(once, rules().backport_links(&source, &forward));
    assert_eq!(once.len(), 3);
}

#[test]
fn successor_links_single_match() {
    let comments = vec![Comment::new(
        "dev",
        "deprecated by https://github.com/org/repo/pull/99",
    )];
    let links = rules().successor_links(&comments);
    assert_eq!(links.len(), 1);
    assert!(links[0].ends_with("/pull/99"));
}

#[test]
fn successor_links_empty_without_matching_comments() {
    let comments = vec![
        Comment::new("dev", "see https://github.com/org/repo/pull/99"),
        Comment::new("dev", "closing in favor of a different approach"),
    ];
    assert!(rules().successor_links(&comments).is_empty());
    assert!(rules().successor_links(&[]).is_empty());
}

#[parameterized(
    reopening = { "Reopening this here: https://github.com/o/r/pull/5" },
    favor = { "Closing In Favor Of https://github.com/o/r/pull/5" },
    favour = { "in favour of https://github.com/o/r/pull/5." },
)]
fn successor_phrases_case_insensitive(line: &str) {
    let links = rules().successor_links(&[Comment::new("dev", line)]);
    assert_eq!(links, vec!["https://github.com/o/r/pull/5".to_string()]);
}

#[test]
fn successor_links_keeps_every_candidate_once() {
    let comments = vec![
        Comment::new(
            "dev",
            "in favor of https://github.com/o/r/pull/5 and https://github.com/o/r/pull/6",
        ),
        Comment::new("dev", "deprecated by https://github.com/o/r/pull/5"),
    ];
    let links = rules().successor_links(&comments);
    assert_eq!(
        links,
        vec![
            "https://github.com/o/r/pull/5".to_string(),
            "https://github.com/o/r/pull/6".to_string()
        ]
    );
}

#[test]
fn successor_links_keep_owner_case() {
    let comments = vec![
        Comment::new("dev", "Deprecated by https://github.com/RedHatInsights/r/pull/5"),
        Comment::new("dev", "in favor of https://github.com/redhatinsights/r/pull/5"),
    ];
    let links = rules().successor_links(&comments);
    assert_eq!(links, vec!["https://github.com/RedHatInsights/r/pull/5".to_string()]);
}

#[parameterized(
    cherry_pick_x = { "Fix\n\n(cherry picked from commit abc123)", Some("abc123") },
    trailing_blank = { "Fix\n(cherry picked from commit abc123)\n\n", Some("abc123") },
    plain = { "Fix bug", Some("bug") },
    empty = { "", None },
)]
fn cherry_pick_source_cases(message: &str, expected: Option<&str>) {
    assert_eq!(cherry_pick_source(message), expected);
}
