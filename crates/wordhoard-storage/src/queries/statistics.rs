// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live study statistics.

use std::ops::Range;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use wordhoard_core::clock::TIMESTAMP_FORMAT;
use wordhoard_core::types::LEVEL_BUCKETS;
use wordhoard_core::{StudyStatistics, WordhoardError};

use crate::database::Database;
use crate::queries::format_date;

/// Aggregate [`StudyStatistics`] as of `today`, read in one snapshot.
///
/// `today_bounds` is the learner's day in UTC; `created_at` is compared
/// against it, not against the UTC date.
pub async fn study_statistics(
    db: &Database,
    today: NaiveDate,
    today_bounds: Range<DateTime<Utc>>,
) -> Result<StudyStatistics, WordhoardError> {
    let today = format_date(today);
    let day_start = today_bounds.start.format(TIMESTAMP_FORMAT).to_string();
    let day_end = today_bounds.end.format(TIMESTAMP_FORMAT).to_string();
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let (total_words, mastered_words): (u64, u64) = tx.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN mastered != 0 THEN 1 ELSE 0 END), 0)
             FROM words",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let today_learned: u64 = tx.query_row(
            "SELECT COUNT(*) FROM learning_stats WHERE created_at >= ?1 AND created_at < ?2",
            params![day_start, day_end],
            |r| r.get(0),
        )?;
        let due_count: u64 = tx.query_row(
            "SELECT COUNT(*) FROM learning_stats ls JOIN words w ON w.id = ls.word_id
             WHERE ls.due_date <= ?1 AND COALESCE(w.mastered, 0) = 0",
            params![today],
            |r| r.get(0),
        )?;

        let mut level_distribution = [0u64; LEVEL_BUCKETS];
        {
            let mut stmt = tx.prepare(
                "SELECT COALESCE(ls.memory_level, 0) AS level, COUNT(*)
                 FROM words w LEFT JOIN learning_stats ls ON ls.word_id = w.id
                 WHERE COALESCE(w.mastered, 0) = 0
                 GROUP BY level",
            )?;
            let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, u64>(1)?)))?;
            for row in rows {
                let (level, count) = row?;
                let bucket = level.clamp(0, LEVEL_BUCKETS as i64 - 1) as usize;
                level_distribution[bucket] += count;
            }
        }
        tx.commit()?;

        Ok(StudyStatistics {
            today_learned,
            due_count,
            level_distribution,
            total_words,
            mastered_words,
        })
    })
    .await
}
