// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::env;
use crate::error::{Error, Result};
use crate::jira::{self, JiraClient};

pub async fn run(config: &Config, output: Option<&Path>) -> Result<()> {
    let token = env::jira_token().ok_or(Error::MissingCredential {
        name: "JIRA_TOKEN",
        hint: "create a personal access token on the Jira server",
    })?;
    let client = JiraClient::new(
        &config.jira,
        &token,
        config.request_timeout(),
        &config.retry,
    )?;
    let path = output.unwrap_or(config.snapshot.path.as_path());

    info!("fetching {} from {}", client.jql(), config.jira.server);
    let issues = client.fetch_all().await?;
    jira::write_snapshot(path, &issues)?;
    info!("wrote {} issues to {}", issues.len(), path.display());
    Ok(())
}
