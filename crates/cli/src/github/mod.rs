// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub access: REST payloads, the HTTP client, and local checkouts.

mod api;
mod checkout;
mod client;

pub use checkout::Checkouts;
pub use client::GitHubClient;
