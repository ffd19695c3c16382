// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The consumer-facing study store trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::WordhoardError;
use crate::lifecycle::{LifecycleListener, Subscription};
use crate::types::{
    FlashCardWord, HealthStatus, LearningStat, StudyStatistics, WordDetails, WordId,
};

/// Everything screens and background jobs may ask of the storage core.
///
/// Lifecycle methods may be called at any time. Study methods fail with
/// [`WordhoardError::NotReady`] until initialization has completed.
#[async_trait]
pub trait StudyStore: Send + Sync + 'static {
    /// Bootstrap, open, and migrate the database. Concurrent callers share one attempt.
    async fn initialize(&self) -> Result<(), WordhoardError>;

    /// Whether the store is ready for study operations.
    fn is_ready(&self) -> bool;

    /// Trigger initialization as needed and wait up to `timeout` for readiness.
    async fn wait_for_ready(&self, timeout: Duration) -> bool;

    /// Register a lifecycle listener. It is called with the current state immediately.
    fn subscribe(&self, listener: LifecycleListener) -> Subscription;

    /// Reject queued operations, close the handle, and return to `Closed`.
    async fn force_reset(&self) -> Result<(), WordhoardError>;

    /// Checkpoint and close the database for a clean exit.
    async fn shutdown(&self) -> Result<(), WordhoardError>;

    /// Probe the store.
    async fn health_check(&self) -> HealthStatus;

    /// Record one answer and return the word's updated learning stat.
    async fn update_learning_stats(
        &self,
        word_id: WordId,
        is_correct: bool,
    ) -> Result<LearningStat, WordhoardError>;

    /// Studied words whose due date has arrived, most overdue first.
    async fn get_words_for_review(&self, limit: u32) -> Result<Vec<FlashCardWord>, WordhoardError>;

    /// Random never-studied words.
    async fn get_new_words_for_learning(
        &self,
        limit: u32,
    ) -> Result<Vec<FlashCardWord>, WordhoardError>;

    /// Random review words followed by random new words.
    async fn get_mixed_words_for_practice(
        &self,
        limit: u32,
    ) -> Result<Vec<FlashCardWord>, WordhoardError>;

    /// Live study counters.
    async fn get_study_statistics(&self) -> Result<StudyStatistics, WordhoardError>;

    /// Toggle a word's mastered flag by hand.
    async fn set_word_mastered(&self, word_id: WordId, mastered: bool)
    -> Result<(), WordhoardError>;

    /// Remove every learning stat and clear every mastered flag. Returns stats removed.
    async fn reset_progress(&self) -> Result<u64, WordhoardError>;

    /// Remove one word's learning stat and clear its mastered flag.
    async fn reset_word_progress(&self, word_id: WordId) -> Result<bool, WordhoardError>;

    /// Full dictionary entry for one word.
    async fn get_word_details(&self, word_id: WordId) -> Result<WordDetails, WordhoardError>;
}
