// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy shared by the HTTP collaborators.
//!
//! Responses are classified by status; retryable failures wait with a
//! doubling delay (or the server's `Retry-After`) until the configured
//! number of retries is used up, which surfaces as
//! [`bpaudit_core::Error::Transient`].

use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::Result;

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Success,
    NotFound,
    Retry,
    Fail,
}

/// Classifies a response by status and `x-ratelimit-remaining`.
pub fn classify(status: StatusCode, rate_remaining: Option<&str>) -> Disposition {
    if status.is_success() {
        Disposition::Success
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        Disposition::NotFound
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Disposition::Retry
    } else if status == StatusCode::FORBIDDEN && rate_remaining == Some("0") {
        Disposition::Retry
    } else {
        Disposition::Fail
    }
}

/// Delay to wait before the next attempt: `Retry-After` if the server sent
/// one, else `current`, capped at `max`.
pub fn backoff_delay(current: Duration, retry_after: Option<Duration>, max: Duration) -> Duration {
    retry_after.unwrap_or(current).min(max)
}

pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}

/// Attempt counter for one request.
#[derive(Debug)]
pub struct Backoff {
    policy: RetryConfig,
    failures: u32,
    delay: Duration,
}

impl Backoff {
    pub fn new(policy: &RetryConfig) -> Self {
        Backoff {
            policy: policy.clone(),
            failures: 0,
            delay: policy.initial_delay(),
        }
    }

    /// Records a failed attempt and sleeps before the next one.
    ///
    /// Fails with `Transient` once `max_retries` retries were spent.
    pub async fn wait(
        &mut self,
        request: &str,
        reason: &str,
        server_delay: Option<Duration>,
    ) -> Result<()> {
        self.failures = self.failures.saturating_add(1);
        if self.failures > self.policy.max_retries {
            return Err(bpaudit_core::Error::Transient(format!(
                "{request}: {reason} after {} attempts",
                self.failures
            ))
            .into());
        }

        let max = self.policy.max_delay();
        let wait = backoff_delay(self.delay, server_delay, max);
        warn!("{} ({}), retrying in {:?}", request, reason, wait);
        tokio::time::sleep(wait).await;
        self.delay = self.delay.saturating_mul(2).min(max);
        Ok(())
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
