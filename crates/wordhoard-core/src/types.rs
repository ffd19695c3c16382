// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the storage, scheduler, and CLI crates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Highest memory level; a word reaching it is mastered.
pub const MASTERED_LEVEL: u8 = 6;

/// Number of buckets in the memory-level histogram (levels 0 through 6).
pub const LEVEL_BUCKETS: usize = MASTERED_LEVEL as usize + 1;

/// Unique identifier for a word row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub i64);

impl std::fmt::Display for WordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is ready and answered a probe query.
    Healthy,
    /// Store is reachable but not fully operational (e.g. still initializing).
    Degraded(String),
    /// Store is not operational.
    Unhealthy(String),
}

/// A headword loaded from the seed database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub word: String,
    pub pos: Option<String>,
    /// UK phonetic symbol and its text rendering.
    pub phonetic: Option<String>,
    pub phonetic_text: Option<String>,
    /// US phonetic symbol and its text rendering.
    pub phonetic_am: Option<String>,
    pub phonetic_am_text: Option<String>,
    pub mastered: bool,
    pub created_at: Option<String>,
}

/// One definition of a word, ordered within its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    pub id: i64,
    pub word_id: WordId,
    pub definition: String,
    pub sense_order: i64,
}

/// An example sentence attached to a sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub id: i64,
    pub sense_id: i64,
    /// Collocation fragment, if the example illustrates one.
    pub cf: Option<String>,
    /// The example sentence.
    pub x: String,
    pub example_order: i64,
}

/// Per-word spaced-repetition record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningStat {
    pub id: i64,
    pub word_id: WordId,
    /// Recall strength, 0 (new/forgotten) through 6 (mastered).
    pub memory_level: u8,
    /// Earliest day this word should be shown again.
    pub due_date: NaiveDate,
    pub times_seen: u32,
    pub times_correct: u32,
    /// Interval in days that produced `due_date`.
    pub last_interval: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// The scheduler's decision for one answer, written back in a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningStatUpdate {
    pub memory_level: u8,
    pub due_date: NaiveDate,
    pub times_seen: u32,
    pub times_correct: u32,
    pub last_interval: u32,
    /// Set the word's `mastered` flag as part of the same write.
    pub mark_mastered: bool,
}

/// Which pool a flash card was drawn from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StudySource {
    /// A studied word whose due date has arrived.
    Review,
    /// A word that has never been answered.
    New,
}

/// A word prepared for a flash-card session.
///
/// Carries only the first sense and that sense's first example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashCardWord {
    pub word: Word,
    pub source: StudySource,
    pub stat: Option<LearningStat>,
    pub definition: Option<String>,
    pub example: Option<String>,
    pub collocation: Option<String>,
}

/// A sense together with all of its examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseWithExamples {
    pub sense: Sense,
    pub examples: Vec<Example>,
}

/// Full dictionary entry for one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDetails {
    pub word: Word,
    pub senses: Vec<SenseWithExamples>,
    pub stat: Option<LearningStat>,
}

/// Aggregate study counters, recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStatistics {
    /// Learning stats created today (words studied for the first time today).
    pub today_learned: u64,
    /// Due, unmastered words.
    pub due_count: u64,
    /// Memory-level histogram over unmastered words; words never studied count as level 0.
    pub level_distribution: [u64; LEVEL_BUCKETS],
    pub total_words: u64,
    pub mastered_words: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn study_source_round_trips_through_strings() {
        assert_eq!(StudySource::Review.to_string(), "review");
        assert_eq!(StudySource::from_str("new").unwrap(), StudySource::New);
        let json = serde_json::to_string(&StudySource::Review).unwrap();
        assert_eq!(json, "\"review\"");
    }

    #[test]
    fn statistics_default_has_seven_buckets() {
        let stats = StudyStatistics::default();
        assert_eq!(stats.level_distribution.len(), 7);
        assert_eq!(stats.level_distribution.iter().sum::<u64>(), 0);
    }

    #[test]
    fn word_id_renders_as_plain_integer() {
        assert_eq!(serde_json::to_string(&WordId(7)).unwrap(), "7");
        assert_eq!(WordId(7).to_string(), "7");
        assert_eq!(format!("[{:>5}]", WordId(7)), "[    7]");
    }
}
