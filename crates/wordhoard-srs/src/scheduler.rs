// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spaced-repetition service over the shared database handle.
//!
//! Every operation is queued through the coordinator, so study reads and
//! answer writes never run concurrently with each other or with
//! initialization housekeeping.

use std::sync::Arc;

use tracing::{debug, info};
use wordhoard_config::StudyConfig;
use wordhoard_core::{
    Clock, FlashCardWord, LearningStat, StudyStatistics, WordDetails, WordId, WordhoardError,
};
use wordhoard_storage::queries::{learning_stats, statistics, study, words};
use wordhoard_storage::{InitializationCoordinator, ReviewOrder};

use crate::algorithm::{next_state, split_mixed_limit};

/// Decides what to study and records how it went.
#[derive(Clone)]
pub struct SpacedRepetitionScheduler {
    coordinator: InitializationCoordinator,
    clock: Arc<dyn Clock>,
    study: StudyConfig,
}

impl SpacedRepetitionScheduler {
    pub fn new(
        coordinator: InitializationCoordinator,
        clock: Arc<dyn Clock>,
        study: StudyConfig,
    ) -> Self {
        Self {
            coordinator,
            clock,
            study,
        }
    }

    pub fn study_config(&self) -> &StudyConfig {
        &self.study
    }

    /// Record one answer.
    ///
    /// Read, compute, and write happen in a single IMMEDIATE transaction.
    /// Reaching the top level marks the word mastered in that same
    /// transaction.
    pub async fn update_learning_stats(
        &self,
        word_id: WordId,
        is_correct: bool,
    ) -> Result<LearningStat, WordhoardError> {
        let clock = self.clock.clone();
        let stat = self
            .coordinator
            .run("update_learning_stats", move |db| {
                let today = clock.today();
                let timestamp = clock.timestamp();
                async move {
                    learning_stats::record_answer(&db, word_id, timestamp, move |current| {
                        next_state(current, is_correct, today)
                    })
                    .await
                }
            })
            .await?;
        debug!(
            word_id = %word_id,
            is_correct,
            level = stat.memory_level,
            due = %stat.due_date,
            "answer recorded"
        );
        Ok(stat)
    }

    /// Due words, most overdue first.
    pub async fn words_for_review(&self, limit: u32) -> Result<Vec<FlashCardWord>, WordhoardError> {
        self.review(limit, ReviewOrder::MostOverdue).await
    }

    /// Random never-studied words.
    pub async fn new_words_for_learning(
        &self,
        limit: u32,
    ) -> Result<Vec<FlashCardWord>, WordhoardError> {
        self.coordinator
            .run("new_words_for_learning", move |db| async move {
                study::new_words(&db, limit).await
            })
            .await
    }

    /// A random review sample followed by a random new-word sample.
    ///
    /// The review share of `limit` comes from `study.review_share_percent`.
    /// Neither pool tops up the other when it runs short.
    pub async fn mixed_words_for_practice(
        &self,
        limit: u32,
    ) -> Result<Vec<FlashCardWord>, WordhoardError> {
        let (review_limit, new_limit) = split_mixed_limit(limit, self.study.review_share_percent);
        let mut cards = self.review(review_limit, ReviewOrder::Random).await?;
        let review_count = cards.len();
        cards.extend(self.new_words_for_learning(new_limit).await?);
        debug!(
            limit,
            review = review_count,
            new = cards.len() - review_count,
            "mixed practice set selected"
        );
        Ok(cards)
    }

    pub async fn study_statistics(&self) -> Result<StudyStatistics, WordhoardError> {
        let clock = self.clock.clone();
        self.coordinator
            .run("study_statistics", move |db| {
                let today = clock.today();
                let bounds = clock.today_bounds();
                async move { statistics::study_statistics(&db, today, bounds).await }
            })
            .await
    }

    /// Set or clear a word's mastered flag by hand.
    pub async fn set_word_mastered(
        &self,
        word_id: WordId,
        mastered: bool,
    ) -> Result<(), WordhoardError> {
        let found = self
            .coordinator
            .run("set_word_mastered", move |db| async move {
                words::set_mastered(&db, word_id, mastered).await
            })
            .await?;
        if !found {
            return Err(WordhoardError::NotFound {
                entity: "word",
                id: word_id.0,
            });
        }
        info!(word_id = %word_id, mastered, "mastery set by hand");
        Ok(())
    }

    /// Delete every learning stat and clear all mastery.
    pub async fn reset_progress(&self) -> Result<u64, WordhoardError> {
        let removed = self
            .coordinator
            .run("reset_progress", |db| async move {
                learning_stats::reset_all(&db).await
            })
            .await?;
        info!(removed, "study progress reset");
        Ok(removed)
    }

    pub async fn reset_word_progress(&self, word_id: WordId) -> Result<bool, WordhoardError> {
        let changed = self
            .coordinator
            .run("reset_word_progress", move |db| async move {
                learning_stats::reset_word(&db, word_id).await
            })
            .await?;
        info!(word_id = %word_id, changed, "word progress reset");
        Ok(changed)
    }

    pub async fn word_details(&self, word_id: WordId) -> Result<WordDetails, WordhoardError> {
        self.coordinator
            .run("word_details", move |db| async move {
                words::get_word_details(&db, word_id).await
            })
            .await?
            .ok_or(WordhoardError::NotFound {
                entity: "word",
                id: word_id.0,
            })
    }

    async fn review(
        &self,
        limit: u32,
        order: ReviewOrder,
    ) -> Result<Vec<FlashCardWord>, WordhoardError> {
        let clock = self.clock.clone();
        self.coordinator
            .run("words_for_review", move |db| {
                let today = clock.today();
                async move { study::review_words(&db, today, limit, order).await }
            })
            .await
    }
}
