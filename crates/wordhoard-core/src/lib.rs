// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Wordhoard storage core.
//!
//! This crate provides the error taxonomy, domain types, lifecycle messages,
//! and the [`StudyStore`] trait used throughout the Wordhoard workspace.

pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::WordhoardError;
pub use lifecycle::{LifecycleListener, LifecycleSnapshot, LifecycleState, Subscription};
pub use traits::StudyStore;
pub use types::{
    Example, FlashCardWord, HealthStatus, LearningStat, LearningStatUpdate, Sense,
    SenseWithExamples, StudySource, StudyStatistics, Word, WordDetails, WordId, MASTERED_LEVEL,
};
