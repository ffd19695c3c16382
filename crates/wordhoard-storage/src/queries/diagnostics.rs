// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only checks used by `wordhoard doctor`.

use wordhoard_core::WordhoardError;

use crate::database::Database;

/// Rows reported by `PRAGMA integrity_check`; `["ok"]` for a sound file.
pub async fn integrity_check(db: &Database) -> Result<Vec<String>, WordhoardError> {
    db.query("PRAGMA integrity_check", Vec::new(), |row| row.get(0))
        .await
}

/// Learning stats whose word no longer exists.
pub async fn orphaned_stats(db: &Database) -> Result<u64, WordhoardError> {
    db.call(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM learning_stats ls
             LEFT JOIN words w ON w.id = ls.word_id
             WHERE w.id IS NULL",
            [],
            |r| r.get::<_, i64>(0),
        )
    })
    .await
    .map(|n| n.max(0) as u64)
}

/// Unmastered words whose stat already sits at the top level.
///
/// These appear after `master --unset` and are valid, but worth showing.
pub async fn top_level_unmastered(db: &Database) -> Result<u64, WordhoardError> {
    db.call(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM learning_stats ls
             JOIN words w ON w.id = ls.word_id
             WHERE ls.memory_level >= 6 AND COALESCE(w.mastered, 0) = 0",
            [],
            |r| r.get::<_, i64>(0),
        )
    })
    .await
    .map(|n| n.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::seeded_db;
    use rusqlite::types::Value;

    #[tokio::test]
    async fn fresh_database_is_clean() {
        let (db, _dir) = seeded_db(&["abandon", "ability"]).await;
        assert_eq!(integrity_check(&db).await.unwrap(), vec!["ok".to_string()]);
        assert_eq!(orphaned_stats(&db).await.unwrap(), 0);
        assert_eq!(top_level_unmastered(&db).await.unwrap(), 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn counts_orphans_and_unmarked_top_levels() {
        let (db, _dir) = seeded_db(&["abandon"]).await;
        // Seeds built elsewhere may not have enforced the reference.
        db.call(|conn| conn.execute_batch("PRAGMA foreign_keys=OFF;"))
            .await
            .unwrap();
        for (word_id, level) in [(1i64, 6i64), (42, 2)] {
            db.execute(
                "INSERT INTO learning_stats
                     (word_id, memory_level, due_date, times_seen, times_correct,
                      last_interval, created_at, updated_at)
                 VALUES (?1, ?2, '2026-03-01', 1, 1, 0, 'x', 'x')",
                vec![Value::Integer(word_id), Value::Integer(level)],
            )
            .await
            .unwrap();
        }
        assert_eq!(orphaned_stats(&db).await.unwrap(), 1);
        assert_eq!(top_level_unmastered(&db).await.unwrap(), 1);
        db.close().await.unwrap();
    }
}
