// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Wordhoard integration tests.
//!
//! [`TestHarness`] builds a packaged-style seed database in a temporary
//! directory, points a config at it, and hands out stores driven by a
//! [`FixedClock`](wordhoard_core::FixedClock).

pub mod harness;

pub use harness::{write_seed, SeedSense, SeedWord, TestHarness, TestHarnessBuilder};
