// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bpaudit - audit release-tracking issues against merged backports.
//!
//! This crate wires the reconciliation engine from `bpaudit-core` to its
//! collaborators:
//!
//! - [`Config`] - TOML configuration (repositories, branches, snapshot, retries)
//! - [`github::GitHubClient`] - the GitHub REST implementation of the code host
//! - [`jira`] - the local issue snapshot and its refresh from Jira
//! - [`Error`] - Error types for all operations

mod cli;
pub mod colors;
mod commands;
mod display;
mod env;
pub mod github;
pub mod jira;
mod logging;
mod retry;

pub mod config;
pub mod error;

#[cfg(test)]
mod test_support;

pub use cli::{Cli, Command, GlobalArgs, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use logging::Verbosity;

/// Execute a parsed command line. Returns after the command finished;
/// diagnostics found by `audit` are not an error.
pub fn run(cli: Cli) -> Result<()> {
    logging::init(Verbosity::from_flags(cli.global.verbose, cli.global.quiet));
    let config_path = cli.global.config.as_deref();

    match cli.command {
        Command::Normalize { versions } => commands::normalize::run(&versions),
        Command::Audit {
            issue,
            jobs,
            output,
        } => {
            let config = Config::load(config_path)?;
            runtime()?.block_on(commands::audit::run(&config, issue.as_deref(), jobs, output))
        }
        Command::Snapshot { output } => {
            let config = Config::load(config_path)?;
            runtime()?.block_on(commands::snapshot::run(&config, output.as_deref()))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
