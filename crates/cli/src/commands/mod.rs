// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod audit;
pub mod normalize;
pub mod snapshot;
