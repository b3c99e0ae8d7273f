// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of audit results and normalized versions.

use bpaudit_core::{Diagnostic, IssueReport};

use crate::colors;
use crate::error::Result;

/// One diagnostic as `[kind] message`.
///
/// When colorized, the kind and the leading issue key are highlighted.
pub fn diagnostic_line(diagnostic: &Diagnostic, colorize: bool) -> String {
    let tag = format!("[{}]", diagnostic.kind);
    if !colorize {
        return format!("{} {}", tag, diagnostic.message);
    }
    let message = match diagnostic.message.strip_prefix(diagnostic.issue.as_str()) {
        Some(rest) => format!("{}{}", colors::header(&diagnostic.issue), rest),
        None => diagnostic.message.clone(),
    };
    format!("{} {}", colors::kind(&tag), message)
}

/// All diagnostics, one per line.
pub fn render_text(diagnostics: &[Diagnostic], colorize: bool) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{}\n", diagnostic_line(d, colorize)))
        .collect()
}

/// Diagnostics as a pretty JSON array of `{issue, kind, message}`.
pub fn render_json(diagnostics: &[Diagnostic]) -> Result<String> {
    Ok(serde_json::to_string_pretty(diagnostics)?)
}

/// Closing summary line.
pub fn summary(reports: &[IssueReport]) -> String {
    let count: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    let affected = reports.iter().filter(|r| !r.diagnostics.is_empty()).count();
    let audited = reports.iter().filter(|r| !r.pulls.is_empty() || !r.diagnostics.is_empty()).count();
    format!(
        "{} {} in {} of {} audited {}",
        count,
        plural(count, "diagnostic", "diagnostics"),
        affected,
        audited,
        plural(audited, "issue", "issues"),
    )
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

/// `label<TAB>release-line`, with `-` when the label maps to nothing.
pub fn normalize_line(label: &str, normalized: Option<&str>) -> String {
    format!("{}\t{}", label, normalized.unwrap_or("-"))
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
