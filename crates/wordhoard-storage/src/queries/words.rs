// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word, sense, and example reads; manual mastery toggling.

use rusqlite::{params, OptionalExtension};
use wordhoard_core::{
    Example, Sense, SenseWithExamples, Word, WordDetails, WordId, WordhoardError,
};

use crate::database::Database;
use crate::queries::{map_stat, map_word, STAT_COLUMNS, WORD_COLUMNS, WORD_COLUMN_COUNT};

/// Get a word by ID.
pub async fn get_word(
    db: &Database,
    word_id: WordId,
) -> Result<Option<Word>, WordhoardError> {
    let sql = format!("SELECT {WORD_COLUMNS} FROM words w WHERE w.id = ?1");
    db.call(move |conn| {
        conn.query_row(&sql, params![word_id.0], |row| map_word(row, 0))
            .optional()
    })
    .await
}

/// Set or clear a word's `mastered` flag. Returns false when the word does not exist.
pub async fn set_mastered(
    db: &Database,
    word_id: WordId,
    mastered: bool,
) -> Result<bool, WordhoardError> {
    db.call(move |conn| {
        let changed = conn.execute(
            "UPDATE words SET mastered = ?2 WHERE id = ?1",
            params![word_id.0, mastered],
        )?;
        Ok(changed > 0)
    })
    .await
}

/// A word with every sense and example, in display order, plus its stat.
pub async fn get_word_details(
    db: &Database,
    word_id: WordId,
) -> Result<Option<WordDetails>, WordhoardError> {
    let head_sql = format!(
        "SELECT {WORD_COLUMNS}, {STAT_COLUMNS}
         FROM words w LEFT JOIN learning_stats ls ON ls.word_id = w.id
         WHERE w.id = ?1"
    );
    db.call(move |conn| {
        let head = conn
            .query_row(&head_sql, params![word_id.0], |row| {
                Ok((map_word(row, 0)?, map_stat(row, WORD_COLUMN_COUNT)?))
            })
            .optional()?;
        let Some((word, stat)) = head else {
            return Ok(None);
        };

        let mut sense_stmt = conn.prepare(
            "SELECT id, word_id, COALESCE(definition, ''), sense_order
             FROM senses WHERE word_id = ?1 ORDER BY sense_order, id",
        )?;
        let senses = sense_stmt
            .query_map(params![word_id.0], |row| {
                Ok(Sense {
                    id: row.get(0)?,
                    word_id: WordId(row.get(1)?),
                    definition: row.get(2)?,
                    sense_order: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut example_stmt = conn.prepare(
            "SELECT id, sense_id, cf, COALESCE(x, ''), example_order
             FROM examples WHERE sense_id = ?1 ORDER BY example_order, id",
        )?;
        let mut entries = Vec::with_capacity(senses.len());
        for sense in senses {
            let examples = example_stmt
                .query_map(params![sense.id], |row| {
                    Ok(Example {
                        id: row.get(0)?,
                        sense_id: row.get(1)?,
                        cf: row.get(2)?,
                        x: row.get(3)?,
                        example_order: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            entries.push(SenseWithExamples { sense, examples });
        }

        Ok(Some(WordDetails {
            word,
            senses: entries,
            stat,
        }))
    })
    .await
}

/// Total number of words.
pub async fn count_words(db: &Database) -> Result<u64, WordhoardError> {
    db.call(|conn| conn.query_row("SELECT COUNT(*) FROM words", [], |r| r.get(0)))
        .await
}
