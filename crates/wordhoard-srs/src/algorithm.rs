// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-ladder spaced repetition.
//!
//! A word climbs one memory level per correct answer, up to
//! [`MASTERED_LEVEL`], and falls back to level 0 on any incorrect answer.
//! The review interval for a level is read from [`INTERVALS`].

use chrono::{Days, NaiveDate};
use wordhoard_core::{LearningStat, LearningStatUpdate, MASTERED_LEVEL};

/// Review interval in days for each memory level.
pub const INTERVALS: [u32; MASTERED_LEVEL as usize + 1] = [0, 1, 3, 7, 14, 30, 90];

/// Days until the next review for `level`, clamped to the ladder.
pub fn interval_for(level: u8) -> u32 {
    INTERVALS[usize::from(level.min(MASTERED_LEVEL))]
}

/// Compute the state after one answer.
///
/// `current` is the word's stat before the answer, `None` for a word never
/// studied. An incorrect answer resets the level but never clears mastery.
pub fn next_state(
    current: Option<&LearningStat>,
    is_correct: bool,
    today: NaiveDate,
) -> LearningStatUpdate {
    let (level, seen, correct) = current
        .map(|s| (s.memory_level.min(MASTERED_LEVEL), s.times_seen, s.times_correct))
        .unwrap_or((0, 0, 0));

    if !is_correct {
        return LearningStatUpdate {
            memory_level: 0,
            due_date: today,
            times_seen: seen.saturating_add(1),
            times_correct: correct,
            last_interval: 0,
            mark_mastered: false,
        };
    }

    let level = (level + 1).min(MASTERED_LEVEL);
    let interval = interval_for(level);
    LearningStatUpdate {
        memory_level: level,
        due_date: today
            .checked_add_days(Days::new(u64::from(interval)))
            .unwrap_or(NaiveDate::MAX),
        times_seen: seen.saturating_add(1),
        times_correct: correct.saturating_add(1),
        last_interval: interval,
        mark_mastered: level == MASTERED_LEVEL,
    }
}

/// Split a mixed-practice `limit` into `(review, new)` counts.
///
/// The review share is floored; new words take the remainder.
pub fn split_mixed_limit(limit: u32, review_share_percent: u32) -> (u32, u32) {
    let share = u64::from(review_share_percent.min(100));
    let review = (u64::from(limit) * share / 100) as u32;
    (review, limit - review)
}

/// Short human form of an interval: `now`, `3d`, `2w`, `3mo`, `1y`.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{days}d"),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wordhoard_core::WordId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn stat(level: u8, seen: u32, correct: u32) -> LearningStat {
        LearningStat {
            id: 1,
            word_id: WordId(1),
            memory_level: level,
            due_date: today(),
            times_seen: seen,
            times_correct: correct,
            last_interval: interval_for(level),
            created_at: "2026-03-01T00:00:00.000Z".into(),
            updated_at: "2026-03-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn first_correct_answer() {
        let next = next_state(None, true, today());
        assert_eq!(next.memory_level, 1);
        assert_eq!(next.due_date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert_eq!((next.times_seen, next.times_correct), (1, 1));
        assert_eq!(next.last_interval, 1);
        assert!(!next.mark_mastered);
    }

    #[test]
    fn first_incorrect_answer() {
        let next = next_state(None, false, today());
        assert_eq!(next.memory_level, 0);
        assert_eq!(next.due_date, today());
        assert_eq!((next.times_seen, next.times_correct), (1, 0));
        assert_eq!(next.last_interval, 0);
    }

    #[test]
    fn level_five_correct_masters() {
        let next = next_state(Some(&stat(5, 5, 5)), true, today());
        assert_eq!(next.memory_level, 6);
        assert_eq!(next.due_date, NaiveDate::from_ymd_opt(2026, 6, 8).unwrap());
        assert_eq!(next.last_interval, 90);
        assert!(next.mark_mastered);
    }

    #[test]
    fn level_three_incorrect_resets() {
        let next = next_state(Some(&stat(3, 4, 3)), false, today());
        assert_eq!(next.memory_level, 0);
        assert_eq!(next.due_date, today());
        assert_eq!((next.times_seen, next.times_correct), (5, 3));
        assert!(!next.mark_mastered);
    }

    #[test]
    fn mastered_stays_at_top() {
        let next = next_state(Some(&stat(6, 9, 9)), true, today());
        assert_eq!(next.memory_level, 6);
        assert_eq!(next.last_interval, 90);
    }

    #[test]
    fn corrupt_level_is_clamped() {
        let next = next_state(Some(&stat(40, 1, 1)), true, today());
        assert_eq!(next.memory_level, 6);
    }

    #[test]
    fn mixed_limit_split() {
        assert_eq!(split_mixed_limit(15, 70), (10, 5));
        assert_eq!(split_mixed_limit(20, 70), (14, 6));
        assert_eq!(split_mixed_limit(1, 70), (0, 1));
        assert_eq!(split_mixed_limit(0, 70), (0, 0));
        assert_eq!(split_mixed_limit(10, 100), (10, 0));
        assert_eq!(split_mixed_limit(10, 250), (10, 0));
    }

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(3), "3d");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(400), "1y");
    }

    proptest! {
        #[test]
        fn level_stays_in_bounds(level in 0u8..=6, seen in 0u32..1000, correct in any::<bool>()) {
            let next = next_state(Some(&stat(level, seen, seen)), correct, today());
            prop_assert!(next.memory_level <= MASTERED_LEVEL);
        }

        #[test]
        fn correct_climbs_the_ladder(level in 0u8..=6) {
            let next = next_state(Some(&stat(level, 1, 1)), true, today());
            let expected = (level + 1).min(MASTERED_LEVEL);
            prop_assert_eq!(next.memory_level, expected);
            let due = today() + chrono::Duration::days(i64::from(INTERVALS[expected as usize]));
            prop_assert_eq!(next.due_date, due);
            prop_assert_eq!(next.mark_mastered, expected == MASTERED_LEVEL);
        }

        #[test]
        fn incorrect_always_resets(level in 0u8..=6, seen in 0u32..1000) {
            let before = stat(level, seen, seen / 2);
            let next = next_state(Some(&before), false, today());
            prop_assert_eq!(next.memory_level, 0);
            prop_assert_eq!(next.due_date, today());
            prop_assert_eq!(next.times_correct, before.times_correct);
            prop_assert!(!next.mark_mastered);
        }

        #[test]
        fn counters_never_decrease(level in 0u8..=6, seen in 0u32..1000, correct in any::<bool>()) {
            let before = stat(level, seen, seen / 2);
            let next = next_state(Some(&before), correct, today());
            prop_assert_eq!(next.times_seen, before.times_seen + 1);
            prop_assert!(next.times_correct >= before.times_correct);
        }

        #[test]
        fn split_covers_limit(limit in 0u32..10_000, share in 0u32..=100) {
            let (review, new) = split_mixed_limit(limit, share);
            prop_assert_eq!(review + new, limit);
            prop_assert!(review <= limit * share / 100 + 1);
        }
    }
}
