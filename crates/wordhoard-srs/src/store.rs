// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`StudyStore`] trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wordhoard_config::WordhoardConfig;
use wordhoard_core::{
    Clock, FlashCardWord, HealthStatus, LearningStat, LifecycleListener, StudyStatistics,
    StudyStore, Subscription, SystemClock, WordDetails, WordId, WordhoardError,
};
use wordhoard_storage::InitializationCoordinator;

use crate::scheduler::SpacedRepetitionScheduler;

/// SQLite-backed study store.
///
/// Lifecycle calls go to the [`InitializationCoordinator`]; study calls go
/// to the [`SpacedRepetitionScheduler`]. Nothing is opened until
/// [`StudyStore::initialize`] (or `wait_for_ready`) runs.
#[derive(Clone)]
pub struct SqliteStudyStore {
    coordinator: InitializationCoordinator,
    scheduler: SpacedRepetitionScheduler,
}

impl SqliteStudyStore {
    /// Build a store from configuration using the system clock.
    pub fn new(config: &WordhoardConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a store from configuration with an explicit clock.
    pub fn with_clock(config: &WordhoardConfig, clock: Arc<dyn Clock>) -> Self {
        let coordinator = InitializationCoordinator::from_config(config);
        let scheduler =
            SpacedRepetitionScheduler::new(coordinator.clone(), clock, config.study.clone());
        Self {
            coordinator,
            scheduler,
        }
    }

    pub fn coordinator(&self) -> &InitializationCoordinator {
        &self.coordinator
    }

    pub fn scheduler(&self) -> &SpacedRepetitionScheduler {
        &self.scheduler
    }
}

#[async_trait]
impl StudyStore for SqliteStudyStore {
    async fn initialize(&self) -> Result<(), WordhoardError> {
        self.coordinator.initialize().await
    }

    fn is_ready(&self) -> bool {
        self.coordinator.is_ready()
    }

    async fn wait_for_ready(&self, timeout: Duration) -> bool {
        self.coordinator.wait_for_ready(timeout).await
    }

    fn subscribe(&self, listener: LifecycleListener) -> Subscription {
        self.coordinator.subscribe(listener)
    }

    async fn force_reset(&self) -> Result<(), WordhoardError> {
        self.coordinator.force_reset().await
    }

    async fn shutdown(&self) -> Result<(), WordhoardError> {
        self.coordinator.shutdown().await
    }

    async fn health_check(&self) -> HealthStatus {
        self.coordinator.health_check().await
    }

    async fn update_learning_stats(
        &self,
        word_id: WordId,
        is_correct: bool,
    ) -> Result<LearningStat, WordhoardError> {
        self.scheduler.update_learning_stats(word_id, is_correct).await
    }

    async fn get_words_for_review(&self, limit: u32) -> Result<Vec<FlashCardWord>, WordhoardError> {
        self.scheduler.words_for_review(limit).await
    }

    async fn get_new_words_for_learning(
        &self,
        limit: u32,
    ) -> Result<Vec<FlashCardWord>, WordhoardError> {
        self.scheduler.new_words_for_learning(limit).await
    }

    async fn get_mixed_words_for_practice(
        &self,
        limit: u32,
    ) -> Result<Vec<FlashCardWord>, WordhoardError> {
        self.scheduler.mixed_words_for_practice(limit).await
    }

    async fn get_study_statistics(&self) -> Result<StudyStatistics, WordhoardError> {
        self.scheduler.study_statistics().await
    }

    async fn set_word_mastered(
        &self,
        word_id: WordId,
        mastered: bool,
    ) -> Result<(), WordhoardError> {
        self.scheduler.set_word_mastered(word_id, mastered).await
    }

    async fn reset_progress(&self) -> Result<u64, WordhoardError> {
        self.scheduler.reset_progress().await
    }

    async fn reset_word_progress(&self, word_id: WordId) -> Result<bool, WordhoardError> {
        self.scheduler.reset_word_progress(word_id).await
    }

    async fn get_word_details(&self, word_id: WordId) -> Result<WordDetails, WordhoardError> {
        self.scheduler.word_details(word_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_is_usable_as_trait_object() {
        let store: Arc<dyn StudyStore> = Arc::new(SqliteStudyStore::new(&WordhoardConfig::default()));
        assert!(!store.is_ready());
    }
}
