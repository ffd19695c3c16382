// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-entity SQL, one module per concern.
//!
//! Every function takes `&Database` and runs on the database thread. Row
//! mapping shared between modules lives here.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::Row;
use wordhoard_core::{LearningStat, Word, WordId};

pub mod diagnostics;
pub mod learning_stats;
pub mod statistics;
pub mod study;
pub mod words;

/// Storage format of `learning_stats.due_date`.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column list matching [`map_word`], for a `words` table aliased `w`.
pub(crate) const WORD_COLUMNS: &str = "w.id, w.word, w.pos, w.phonetic, w.phonetic_text, \
     w.phonetic_am, w.phonetic_am_text, w.mastered, w.created_at";

/// Column list matching [`map_stat`], for a `learning_stats` table aliased `ls`.
pub(crate) const STAT_COLUMNS: &str = "ls.id, ls.word_id, ls.memory_level, ls.due_date, \
     ls.times_seen, ls.times_correct, ls.last_interval, ls.created_at, ls.updated_at";

pub(crate) const WORD_COLUMN_COUNT: usize = 9;
pub(crate) const STAT_COLUMN_COUNT: usize = 9;

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Map [`WORD_COLUMNS`] starting at column `at`.
pub(crate) fn map_word(row: &Row<'_>, at: usize) -> Result<Word, rusqlite::Error> {
    Ok(Word {
        id: WordId(row.get(at)?),
        word: row.get(at + 1)?,
        pos: row.get(at + 2)?,
        phonetic: row.get(at + 3)?,
        phonetic_text: row.get(at + 4)?,
        phonetic_am: row.get(at + 5)?,
        phonetic_am_text: row.get(at + 6)?,
        mastered: row.get::<_, Option<i64>>(at + 7)?.unwrap_or(0) != 0,
        created_at: row.get(at + 8)?,
    })
}

/// Map [`STAT_COLUMNS`] starting at column `at`; `None` when the join found no stat.
pub(crate) fn map_stat(row: &Row<'_>, at: usize) -> Result<Option<LearningStat>, rusqlite::Error> {
    let Some(id) = row.get::<_, Option<i64>>(at)? else {
        return Ok(None);
    };
    let due: String = row.get(at + 3)?;
    let due_date = NaiveDate::parse_from_str(&due, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(at + 3, Type::Text, Box::new(e)))?;
    Ok(Some(LearningStat {
        id,
        word_id: WordId(row.get(at + 1)?),
        memory_level: row.get(at + 2)?,
        due_date,
        times_seen: row.get(at + 4)?,
        times_correct: row.get(at + 5)?,
        last_interval: row.get(at + 6)?,
        created_at: row.get(at + 7)?,
        updated_at: row.get(at + 8)?,
    }))
}
