// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learning-stat persistence: the answer write path and progress resets.

use rusqlite::{params, OptionalExtension, Transaction};
use wordhoard_core::{LearningStat, LearningStatUpdate, WordId, WordhoardError};

use crate::database::Database;
use crate::queries::{format_date, map_stat, STAT_COLUMNS};

fn read_stat(tx: &Transaction<'_>, word_id: WordId) -> Result<Option<LearningStat>, rusqlite::Error> {
    let sql = format!("SELECT {STAT_COLUMNS} FROM learning_stats ls WHERE ls.word_id = ?1");
    tx.query_row(&sql, params![word_id.0], |row| map_stat(row, 0))
        .optional()
        .map(Option::flatten)
}

fn word_exists(tx: &Transaction<'_>, word_id: WordId) -> Result<bool, rusqlite::Error> {
    tx.query_row("SELECT 1 FROM words WHERE id = ?1", params![word_id.0], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
}

/// Get a word's learning stat.
pub async fn get_stat(
    db: &Database,
    word_id: WordId,
) -> Result<Option<LearningStat>, WordhoardError> {
    let sql = format!("SELECT {STAT_COLUMNS} FROM learning_stats ls WHERE ls.word_id = ?1");
    db.call(move |conn| {
        conn.query_row(&sql, params![word_id.0], |row| map_stat(row, 0))
            .optional()
            .map(Option::flatten)
    })
    .await
}

/// Record one answer as a single read-modify-write.
///
/// Inside one IMMEDIATE transaction: read the current stat, let `decide`
/// compute the next state from it, write the stat (insert or update), and
/// set the word's `mastered` flag when the update asks for it. Returns the
/// stat as written.
pub async fn record_answer<F>(
    db: &Database,
    word_id: WordId,
    timestamp: String,
    decide: F,
) -> Result<LearningStat, WordhoardError>
where
    F: FnOnce(Option<&LearningStat>) -> LearningStatUpdate + Send + 'static,
{
    let written = db
        .transaction(move |tx| {
            if !word_exists(tx, word_id)? {
                return Ok(None);
            }
            let current = read_stat(tx, word_id)?;
            let update = decide(current.as_ref());
            let due = format_date(update.due_date);

            match current {
                Some(_) => {
                    tx.execute(
                        "UPDATE learning_stats
                         SET memory_level = ?2, due_date = ?3, times_seen = ?4,
                             times_correct = ?5, last_interval = ?6, updated_at = ?7
                         WHERE word_id = ?1",
                        params![
                            word_id.0,
                            update.memory_level,
                            due,
                            update.times_seen,
                            update.times_correct,
                            update.last_interval,
                            timestamp,
                        ],
                    )?;
                }
                None => {
                    tx.execute(
                        "INSERT INTO learning_stats
                         (word_id, memory_level, due_date, times_seen, times_correct,
                          last_interval, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                        params![
                            word_id.0,
                            update.memory_level,
                            due,
                            update.times_seen,
                            update.times_correct,
                            update.last_interval,
                            timestamp,
                        ],
                    )?;
                }
            }

            if update.mark_mastered {
                tx.execute(
                    "UPDATE words SET mastered = 1 WHERE id = ?1",
                    params![word_id.0],
                )?;
            }
            read_stat(tx, word_id)
        })
        .await?;

    written.ok_or(WordhoardError::NotFound {
        entity: "word",
        id: word_id.0,
    })
}

/// Delete every learning stat and clear every `mastered` flag.
///
/// Returns the number of stats removed.
pub async fn reset_all(db: &Database) -> Result<u64, WordhoardError> {
    db.transaction(|tx| {
        let removed = tx.execute("DELETE FROM learning_stats", [])?;
        tx.execute("UPDATE words SET mastered = 0 WHERE mastered != 0", [])?;
        Ok(removed as u64)
    })
    .await
}

/// Delete one word's learning stat and clear its `mastered` flag.
///
/// Returns whether anything changed; an unknown word is
/// [`WordhoardError::NotFound`].
pub async fn reset_word(db: &Database, word_id: WordId) -> Result<bool, WordhoardError> {
    let changed = db
        .transaction(move |tx| {
            if !word_exists(tx, word_id)? {
                return Ok(None);
            }
            let removed = tx.execute(
                "DELETE FROM learning_stats WHERE word_id = ?1",
                params![word_id.0],
            )?;
            let unmastered = tx.execute(
                "UPDATE words SET mastered = 0 WHERE id = ?1 AND mastered != 0",
                params![word_id.0],
            )?;
            Ok(Some(removed + unmastered > 0))
        })
        .await?;

    changed.ok_or(WordhoardError::NotFound {
        entity: "word",
        id: word_id.0,
    })
}
