// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spaced-repetition scheduling for Wordhoard.
//!
//! [`algorithm`] holds the pure level ladder. [`SpacedRepetitionScheduler`]
//! applies it against the database through the operation queue, and
//! [`SqliteStudyStore`] puts the scheduler and the connection lifecycle
//! behind the [`wordhoard_core::StudyStore`] trait.

pub mod algorithm;
pub mod scheduler;
pub mod store;

pub use algorithm::{format_interval, next_state, split_mixed_limit, INTERVALS};
pub use scheduler::SpacedRepetitionScheduler;
pub use store::SqliteStudyStore;
