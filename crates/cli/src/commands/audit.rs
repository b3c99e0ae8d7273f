// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use bpaudit_core::{collect_diagnostics, CodeHost, Issue, Reconciler};
use std::io::{self, Write};
use tracing::info;

use crate::cli::OutputFormat;
use crate::colors;
use crate::config::Config;
use crate::display;
use crate::env;
use crate::error::{Error, Result};
use crate::github::GitHubClient;
use crate::jira;

pub async fn run(
    config: &Config,
    issue: Option<&str>,
    jobs: Option<u16>,
    output: OutputFormat,
) -> Result<()> {
    let token = env::github_token().ok_or(Error::MissingCredential {
        name: "GITHUB_TOKEN",
        hint: "create a token with read access to the audited repositories",
    })?;
    let issues = jira::load(&config.snapshot, issue)?;
    let client = GitHubClient::new(config, &token)?;
    let jobs = jobs.map(usize::from).unwrap_or(config.jobs);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_impl(&client, config, &issues, jobs, output, colors::should_colorize(), &mut out).await
}

/// Internal implementation that accepts the code host for testing.
pub(crate) async fn run_impl(
    host: &dyn CodeHost,
    config: &Config,
    issues: &[Issue],
    jobs: usize,
    output: OutputFormat,
    colorize: bool,
    out: &mut impl Write,
) -> Result<()> {
    let auditable = issues.iter().filter(|i| i.is_auditable()).count();
    info!("auditing {} of {} issues, {} at a time", auditable, issues.len(), jobs);

    let reports = Reconciler::new(host, config.engine()).run(issues, jobs).await?;
    let summary = display::summary(&reports);
    let diagnostics = collect_diagnostics(reports);

    match output {
        OutputFormat::Text => write!(out, "{}", display::render_text(&diagnostics, colorize))?,
        OutputFormat::Json => writeln!(out, "{}", display::render_json(&diagnostics)?)?,
    }
    out.flush()?;
    info!("{}", summary);
    Ok(())
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
