// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fix-version label normalization.
//!
//! Maps free-form fix-version labels ("4.3.6", "4.3 (errata)", "4.2cloud7")
//! to the two-component release name of a maintenance branch ("4.3").
//! Labels that do not name a maintenance branch normalize to `None`; that is
//! expected for many labels and is never diagnosed.

use std::collections::BTreeSet;

/// Marker for the continuously-deployed release train.
const CLOUD: &str = "cloud";

/// Returns the canonical release name for a fix-version label, if any.
///
/// Pure and idempotent: `normalize("4.3")` is `Some("4.3")`.
pub fn normalize(raw: &str) -> Option<String> {
    if raw.starts_with(CLOUD) {
        return None;
    }

    let token = raw.split_whitespace().next()?.replace(CLOUD, ".");
    let mut parts = token.split('.');
    let major = parts.next().filter(|p| is_numeric(p))?;
    let minor = parts.next().filter(|p| is_numeric(p))?;

    Some(format!("{major}.{minor}"))
}

/// Normalizes every label, dropping the ones without a release name.
///
/// The result is deduplicated and sorted.
pub fn normalize_all<I, S>(labels: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| normalize(label.as_ref()))
        .collect()
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
