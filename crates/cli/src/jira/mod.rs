// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Jira issue snapshot: loading it for audits and refreshing it from the server.

mod fetch;
mod snapshot;

pub use fetch::{write_snapshot, JiraClient};
pub use snapshot::{load, parse_snapshot};
