// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};

use crate::display;
use crate::error::Result;

pub fn run(versions: &[String]) -> Result<()> {
    let stdout = io::stdout();
    run_impl(versions, &mut stdout.lock())
}

pub(crate) fn run_impl(versions: &[String], out: &mut impl Write) -> Result<()> {
    for label in versions {
        let normalized = bpaudit_core::normalize(label);
        writeln!(out, "{}", display::normalize_line(label, normalized.as_deref()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
