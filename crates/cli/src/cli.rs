// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::colors;

/// Output format for `audit`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "bpaudit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Audit release-tracking issues against the backports that actually landed")]
#[command(
    long_about = "Audit release-tracking issues against the backports that actually landed.\n\n\
    Compares the fix versions an issue declares with the pull requests merged into each \
    maintenance branch and reports every discrepancy."
)]
#[command(styles = colors::styles())]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to a bpaudit.toml config file
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile fix versions with merged backports
    #[command(after_help = colors::examples("\
Examples:
  bpaudit audit                     Audit every issue in the snapshot
  bpaudit audit --issue AAH-1234    Audit a single issue
  bpaudit audit -o json -j 8        JSON output, eight issues at a time"))]
    Audit {
        /// Only audit this issue key
        #[arg(long, value_name = "key")]
        issue: Option<String>,

        /// Issues analysed concurrently (overrides config)
        #[arg(short, long, value_name = "n", value_parser = clap::value_parser!(u16).range(1..))]
        jobs: Option<u16>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Refresh the local issue snapshot from Jira
    #[command(after_help = colors::examples("\
Examples:
  bpaudit snapshot                      Write to the configured snapshot path
  bpaudit snapshot -o /tmp/jiras.json   Write somewhere else"))]
    Snapshot {
        /// Where to write the snapshot (overrides config)
        #[arg(short, long, value_name = "path")]
        output: Option<PathBuf>,
    },

    /// Print the release line a fix-version label maps to
    #[command(after_help = colors::examples("\
Examples:
  bpaudit normalize 4.3.1 \"4.2.0 GA\"   Prints 4.3 and 4.2
  bpaudit normalize cloud             Prints - (not applicable)"))]
    Normalize {
        /// Fix-version labels
        #[arg(required = true, value_name = "version")]
        versions: Vec<String>,
    },
}
