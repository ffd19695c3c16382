// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Study-set selection: due reviews and never-studied words.
//!
//! Each card carries the word's first sense and that sense's first example,
//! picked with correlated subqueries ordered by `sense_order` /
//! `example_order`.

use chrono::NaiveDate;
use rusqlite::params;
use wordhoard_core::{FlashCardWord, StudySource, WordhoardError};

use crate::database::Database;
use crate::queries::{
    format_date, map_stat, map_word, STAT_COLUMNS, STAT_COLUMN_COUNT, WORD_COLUMNS,
    WORD_COLUMN_COUNT,
};

/// Ordering of a review selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOrder {
    /// Earliest due date first, then lowest memory level.
    MostOverdue,
    /// Uniform random sample of the due words.
    Random,
}

const CARD_JOINS: &str = "
    LEFT JOIN senses s ON s.id = (
        SELECT s2.id FROM senses s2 WHERE s2.word_id = w.id
        ORDER BY s2.sense_order, s2.id LIMIT 1)
    LEFT JOIN examples e ON e.id = (
        SELECT e2.id FROM examples e2 WHERE e2.sense_id = s.id
        ORDER BY e2.example_order, e2.id LIMIT 1)";

fn card_sql(filter: &str, order: &str, limit_param: &str) -> String {
    format!(
        "SELECT {WORD_COLUMNS}, {STAT_COLUMNS}, s.definition, e.x, e.cf
         FROM words w
         LEFT JOIN learning_stats ls ON ls.word_id = w.id
         {CARD_JOINS}
         WHERE {filter}
         ORDER BY {order}
         LIMIT {limit_param}"
    )
}

fn map_card(row: &rusqlite::Row<'_>, source: StudySource) -> Result<FlashCardWord, rusqlite::Error> {
    let extra = WORD_COLUMN_COUNT + STAT_COLUMN_COUNT;
    Ok(FlashCardWord {
        word: map_word(row, 0)?,
        source,
        stat: map_stat(row, WORD_COLUMN_COUNT)?,
        definition: row.get(extra)?,
        example: row.get(extra + 1)?,
        collocation: row.get(extra + 2)?,
    })
}

/// Words due on or before `today` that have been seen and are not mastered.
pub async fn review_words(
    db: &Database,
    today: NaiveDate,
    limit: u32,
    order: ReviewOrder,
) -> Result<Vec<FlashCardWord>, WordhoardError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let order_by = match order {
        ReviewOrder::MostOverdue => "ls.due_date ASC, ls.memory_level ASC, w.id ASC",
        ReviewOrder::Random => "RANDOM()",
    };
    let sql = card_sql(
        "ls.id IS NOT NULL AND ls.due_date <= ?1 AND ls.times_seen > 0
         AND COALESCE(w.mastered, 0) = 0",
        order_by,
        "?2",
    );
    let today = format_date(today);
    db.call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![today, limit], |row| map_card(row, StudySource::Review))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    })
    .await
}

/// A random sample of words with no learning stat that are not mastered.
pub async fn new_words(db: &Database, limit: u32) -> Result<Vec<FlashCardWord>, WordhoardError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let sql = card_sql("ls.id IS NULL AND COALESCE(w.mastered, 0) = 0", "RANDOM()", "?1");
    db.call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![limit], |row| map_card(row, StudySource::New))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordhoard_core::WordId;
    use crate::queries::fixtures::seeded_db;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    async fn put_stat(db: &Database, word: i64, level: u8, due: NaiveDate, seen: u32) {
        let due = format_date(due);
        db.execute(
            "INSERT INTO learning_stats
             (word_id, memory_level, due_date, times_seen, times_correct, last_interval,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0, 't', 't')",
            vec![
                word.into(),
                i64::from(level).into(),
                due.into(),
                i64::from(seen).into(),
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn review_orders_by_due_date_then_level() {
        let (db, _dir) = seeded_db(&["a", "b", "c", "d"]).await;
        put_stat(&db, 1, 3, day(5), 2).await;
        put_stat(&db, 2, 1, day(3), 2).await;
        put_stat(&db, 3, 0, day(5), 1).await;
        put_stat(&db, 4, 2, day(20), 1).await;

        let cards = review_words(&db, day(10), 10, ReviewOrder::MostOverdue)
            .await
            .unwrap();
        let ids: Vec<WordId> = cards.iter().map(|c| c.word.id).collect();
        assert_eq!(ids, vec![WordId(2), WordId(3), WordId(1)]);
        assert!(cards.iter().all(|c| c.source == StudySource::Review));
        assert!(cards.iter().all(|c| c.stat.is_some()));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn review_skips_mastered_and_unseen() {
        let (db, _dir) = seeded_db(&["a", "b", "c"]).await;
        put_stat(&db, 1, 6, day(1), 6).await;
        db.execute("UPDATE words SET mastered = 1 WHERE id = 1", vec![])
            .await
            .unwrap();
        put_stat(&db, 2, 0, day(1), 0).await;
        put_stat(&db, 3, 1, day(1), 1).await;

        let cards = review_words(&db, day(1), 10, ReviewOrder::Random).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].word.id, WordId(3));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn review_respects_limit() {
        let (db, _dir) = seeded_db(&["a", "b", "c"]).await;
        for id in 1..=3 {
            put_stat(&db, id, 1, day(1), 1).await;
        }
        let cards = review_words(&db, day(2), 2, ReviewOrder::MostOverdue)
            .await
            .unwrap();
        assert_eq!(cards.len(), 2);
        assert!(review_words(&db, day(2), 0, ReviewOrder::Random)
            .await
            .unwrap()
            .is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cards_carry_first_sense_and_example() {
        let (db, _dir) = seeded_db(&["abandon"]).await;
        let cards = new_words(&db, 5).await.unwrap();
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.source, StudySource::New);
        assert!(card.stat.is_none());
        assert_eq!(card.definition.as_deref(), Some("abandon sense 1"));
        assert_eq!(card.example.as_deref(), Some("abandon example 1.1"));
        assert_eq!(card.collocation.as_deref(), Some("abandon cf 1.1"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn new_words_excludes_studied_and_mastered() {
        let (db, _dir) = seeded_db(&["a", "b", "c", "d"]).await;
        put_stat(&db, 1, 0, day(1), 1).await;
        db.execute("UPDATE words SET mastered = 1 WHERE id = 2", vec![])
            .await
            .unwrap();

        let mut ids: Vec<i64> = new_words(&db, 10)
            .await
            .unwrap()
            .iter()
            .map(|c| c.word.id.0)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(new_words(&db, 1).await.unwrap().len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn word_without_senses_still_appears() {
        let (db, _dir) = seeded_db(&[]).await;
        db.execute(
            "INSERT INTO words (id, word, mastered) VALUES (1, 'bare', 0)",
            vec![],
        )
        .await
        .unwrap();
        let cards = new_words(&db, 5).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert!(cards[0].definition.is_none());
        assert!(cards[0].example.is_none());
        db.close().await.unwrap();
    }
}
