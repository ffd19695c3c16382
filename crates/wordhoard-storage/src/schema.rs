// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Additive, idempotent schema migration by live-schema inspection.
//!
//! Seed databases ship with whatever schema they were built with. Instead of
//! versioned migration scripts, the migrator compares the live schema with
//! [`EXPECTED_SCHEMA`] and only ever adds: missing tables are created,
//! missing columns are appended with `ALTER TABLE ... ADD COLUMN`, and
//! supporting indexes are created `IF NOT EXISTS`. Nothing is dropped or
//! renamed.

use std::collections::HashSet;

use rusqlite::Transaction;
use tracing::{debug, info};
use wordhoard_core::WordhoardError;

use crate::database::Database;

/// One expected column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// Definition used when the whole table is created.
    pub create: &'static str,
    /// Definition used by `ALTER TABLE ... ADD COLUMN`; `None` for key
    /// columns SQLite cannot add after the fact.
    pub add: Option<&'static str>,
}

/// One expected table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl TableSpec {
    fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.create))
            .collect();
        format!("CREATE TABLE {} ({})", self.name, columns.join(", "))
    }
}

const fn key(name: &'static str, create: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        create,
        add: None,
    }
}

const fn col(name: &'static str, def: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        create: def,
        add: Some(def),
    }
}

/// The schema every study operation relies on.
pub const EXPECTED_SCHEMA: &[TableSpec] = &[
    TableSpec {
        name: "words",
        columns: &[
            key("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            key("word", "TEXT NOT NULL"),
            col("pos", "TEXT"),
            col("phonetic", "TEXT"),
            col("phonetic_text", "TEXT"),
            col("phonetic_am", "TEXT"),
            col("phonetic_am_text", "TEXT"),
            col("mastered", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
        ],
    },
    TableSpec {
        name: "senses",
        columns: &[
            key("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            key(
                "word_id",
                "INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE",
            ),
            col("definition", "TEXT"),
            col("sense_order", "INTEGER NOT NULL DEFAULT 0"),
        ],
    },
    TableSpec {
        name: "examples",
        columns: &[
            key("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            key(
                "sense_id",
                "INTEGER NOT NULL REFERENCES senses(id) ON DELETE CASCADE",
            ),
            col("cf", "TEXT"),
            col("x", "TEXT"),
            col("example_order", "INTEGER NOT NULL DEFAULT 0"),
        ],
    },
    TableSpec {
        name: "learning_stats",
        columns: &[
            key("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            key(
                "word_id",
                "INTEGER NOT NULL UNIQUE REFERENCES words(id) ON DELETE CASCADE",
            ),
            col("memory_level", "INTEGER NOT NULL DEFAULT 0"),
            key("due_date", "TEXT NOT NULL"),
            col("created_at", "TEXT NOT NULL DEFAULT ''"),
            col("updated_at", "TEXT NOT NULL DEFAULT ''"),
            col("times_seen", "INTEGER NOT NULL DEFAULT 0"),
            col("times_correct", "INTEGER NOT NULL DEFAULT 0"),
            col("last_interval", "INTEGER NOT NULL DEFAULT 0"),
        ],
    },
];

/// Indexes backing the study queries.
const EXPECTED_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_learning_stats_word ON learning_stats(word_id)",
    "CREATE INDEX IF NOT EXISTS idx_learning_stats_due ON learning_stats(due_date, memory_level)",
    "CREATE INDEX IF NOT EXISTS idx_senses_word ON senses(word_id, sense_order)",
    "CREATE INDEX IF NOT EXISTS idx_examples_sense ON examples(sense_id, example_order)",
];

/// What one migration pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub created_tables: Vec<String>,
    /// `table.column` for every column appended.
    pub added_columns: Vec<String>,
}

impl MigrationReport {
    /// True when the live schema already matched.
    pub fn is_noop(&self) -> bool {
        self.created_tables.is_empty() && self.added_columns.is_empty()
    }
}

/// Brings a database up to [`EXPECTED_SCHEMA`].
#[derive(Debug, Clone, Copy)]
pub struct SchemaMigrator {
    tables: &'static [TableSpec],
}

impl Default for SchemaMigrator {
    fn default() -> Self {
        Self {
            tables: EXPECTED_SCHEMA,
        }
    }
}

impl SchemaMigrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create missing tables, add missing columns, and ensure indexes, in
    /// one transaction.
    ///
    /// Lock contention and a closed handle pass through unchanged so the
    /// caller can retry; anything else becomes [`WordhoardError::Schema`].
    pub async fn ensure_schema(&self, db: &Database) -> Result<MigrationReport, WordhoardError> {
        let tables = self.tables;
        let result = db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                let report = apply(&tx, tables)?;
                if report.is_ok() {
                    tx.commit()?;
                }
                Ok(report)
            })
            .await;

        let report = match result {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => return Err(e),
            Err(e) if e.is_lock_related() || matches!(e, WordhoardError::NotOpen) => {
                return Err(e);
            }
            Err(e) => return Err(WordhoardError::schema("cannot update schema", e)),
        };

        if report.is_noop() {
            debug!("schema up to date");
        } else {
            info!(
                created_tables = ?report.created_tables,
                added_columns = ?report.added_columns,
                "schema migrated"
            );
        }
        Ok(report)
    }

    /// What [`Self::ensure_schema`] would change, without writing anything.
    pub async fn pending(&self, db: &Database) -> Result<MigrationReport, WordhoardError> {
        let tables = self.tables;
        db.call(move |conn| {
            let mut report = MigrationReport::default();
            for table in tables {
                if !table_exists(conn, table.name)? {
                    report.created_tables.push(table.name.to_string());
                    continue;
                }
                let live = live_columns(conn, table.name)?;
                report.added_columns.extend(
                    table
                        .columns
                        .iter()
                        .filter(|c| !live.contains(c.name))
                        .map(|c| format!("{}.{}", table.name, c.name)),
                );
            }
            Ok(report)
        })
        .await
    }
}

/// The migration pass itself. The outer `Result` carries SQLite failures; the
/// inner one a schema the migrator cannot repair.
fn apply(
    tx: &Transaction<'_>,
    tables: &[TableSpec],
) -> Result<Result<MigrationReport, WordhoardError>, rusqlite::Error> {
    let mut report = MigrationReport::default();

    for table in tables {
        if !table_exists(tx, table.name)? {
            tx.execute(&table.create_sql(), [])?;
            report.created_tables.push(table.name.to_string());
            continue;
        }

        let live = live_columns(tx, table.name)?;
        for column in table.columns {
            if live.contains(column.name) {
                continue;
            }
            let Some(def) = column.add else {
                return Ok(Err(WordhoardError::Schema {
                    message: format!(
                        "table `{}` lacks key column `{}` and cannot be repaired in place",
                        table.name, column.name
                    ),
                    source: None,
                }));
            };
            tx.execute(
                &format!("ALTER TABLE {} ADD COLUMN {} {}", table.name, column.name, def),
                [],
            )?;
            report
                .added_columns
                .push(format!("{}.{}", table.name, column.name));
        }
    }

    for index in EXPECTED_INDEXES {
        tx.execute(index, [])?;
    }

    Ok(Ok(report))
}

fn table_exists(conn: &rusqlite::Connection, table: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}

fn live_columns(
    conn: &rusqlite::Connection,
    table: &str,
) -> Result<HashSet<String>, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    names.collect()
}
