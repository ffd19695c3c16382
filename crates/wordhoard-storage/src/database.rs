// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{Row, Transaction, TransactionBehavior};
use tracing::debug;
use wordhoard_config::StorageConfig;
use wordhoard_core::WordhoardError;

/// The single open handle to the study database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: PathBuf,
}

impl Database {
    /// Open the database at `path` and apply connection tuning.
    ///
    /// The file is created when absent. Pragmas run once, before any other
    /// statement can reach the handle.
    pub async fn open(
        path: impl AsRef<Path>,
        config: &StorageConfig,
    ) -> Result<Self, WordhoardError> {
        let path = path.as_ref().to_path_buf();
        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| WordhoardError::Connection {
                source: Box::new(e),
            })?;

        let pragmas = pragma_batch(config);
        conn.call(move |conn| conn.execute_batch(&pragmas))
            .await
            .map_err(map_tr_err)?;

        debug!(path = %path.display(), wal = config.wal_mode, "database opened");
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a closure against the raw connection on the database thread.
    pub async fn call<F, T>(&self, f: F) -> Result<T, WordhoardError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        self.conn.call(f).await.map_err(map_tr_err)
    }

    /// Execute one statement with positional parameters. Returns rows changed.
    pub async fn execute(
        &self,
        sql: impl Into<String>,
        params: Vec<Value>,
    ) -> Result<usize, WordhoardError> {
        let sql = sql.into();
        self.call(move |conn| conn.execute(&sql, rusqlite::params_from_iter(params)))
            .await
    }

    /// Run a query with positional parameters and map every row.
    pub async fn query<T, M>(
        &self,
        sql: impl Into<String>,
        params: Vec<Value>,
        mut map_row: M,
    ) -> Result<Vec<T>, WordhoardError>
    where
        T: Send + 'static,
        M: FnMut(&Row<'_>) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let sql = sql.into();
        self.call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| map_row(row))?;
            rows.collect()
        })
        .await
    }

    /// Run `f` inside an IMMEDIATE transaction.
    ///
    /// The write lock is taken up front, so a read-modify-write inside `f`
    /// cannot interleave with another writer. Commits when `f` returns `Ok`,
    /// rolls back (on drop) otherwise.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T, WordhoardError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await
    }

    /// Checkpoint the WAL and release the handle.
    ///
    /// The checkpoint is best effort. Every later call on this handle (or a
    /// clone of its connection) fails with [`WordhoardError::NotOpen`].
    pub async fn close(&self) -> Result<(), WordhoardError> {
        if let Err(e) = self
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
        {
            debug!(error = %e, "WAL checkpoint before close failed");
        }
        self.conn.clone().close().await.map_err(map_tr_err)?;
        debug!(path = %self.path.display(), "database closed");
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

fn pragma_batch(config: &StorageConfig) -> String {
    let mut batch = String::new();
    if config.wal_mode {
        batch.push_str("PRAGMA journal_mode=WAL;\n");
    }
    batch.push_str(&format!(
        "PRAGMA synchronous=NORMAL;
         PRAGMA temp_store=MEMORY;
         PRAGMA cache_size=-{};
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout={};",
        config.cache_size_kib, config.busy_timeout_ms
    ));
    batch
}

/// True for SQLITE_BUSY and SQLITE_LOCKED.
pub fn is_contention(err: &rusqlite::Error) -> bool {
    use rusqlite::ffi;
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            ffi::Error {
                code: ffi::ErrorCode::DatabaseBusy | ffi::ErrorCode::DatabaseLocked,
                ..
            },
            _,
        )
    )
}

/// Classify a rusqlite error into the caller-visible taxonomy.
pub fn classify(err: rusqlite::Error) -> WordhoardError {
    use rusqlite::ffi::ErrorCode;

    if is_contention(&err) {
        return WordhoardError::LockContention {
            message: err.to_string(),
        };
    }
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(
                e.code,
                ErrorCode::NotADatabase
                    | ErrorCode::CannotOpen
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::SystemIoFailure
            ) =>
        {
            WordhoardError::Connection {
                source: Box::new(err),
            }
        }
        _ => WordhoardError::Query {
            source: Box::new(err),
        },
    }
}

/// Convert a tokio-rusqlite error into a `WordhoardError`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> WordhoardError {
    match e {
        tokio_rusqlite::Error::Error(err) => classify(err),
        tokio_rusqlite::Error::ConnectionClosed => WordhoardError::NotOpen,
        other => WordhoardError::Connection {
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db"), &StorageConfig::default())
            .await
            .unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn open_applies_pragmas() {
        let (db, _dir) = setup_db().await;
        let (mode, fk): (String, i64) = db
            .call(|conn| {
                let mode = conn.query_row("PRAGMA journal_mode", [], |r| r.get(0))?;
                let fk = conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?;
                Ok((mode, fk))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        assert_eq!(fk, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn execute_and_query_with_params() {
        let (db, _dir) = setup_db().await;
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", vec![])
            .await
            .unwrap();
        let changed = db
            .execute(
                "INSERT INTO t (name) VALUES (?1), (?2)",
                vec![Value::from("a".to_string()), Value::from("b".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(changed, 2);

        let names = db
            .query(
                "SELECT name FROM t WHERE id > ?1 ORDER BY id",
                vec![Value::Integer(0)],
                |row| row.get::<_, String>(0),
            )
            .await
            .unwrap();
        assert_eq!(names, vec!["a", "b"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_transaction_rolls_back() {
        let (db, _dir) = setup_db().await;
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", vec![])
            .await
            .unwrap();

        let result = db
            .transaction(|tx| {
                tx.execute("INSERT INTO t (id) VALUES (1)", [])?;
                tx.execute("INSERT INTO t (id) VALUES (1)", [])?;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(WordhoardError::Query { .. })));

        let count: i64 = db
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn calls_after_close_fail_with_not_open() {
        let (db, _dir) = setup_db().await;
        db.close().await.unwrap();
        let err = db.execute("SELECT 1", vec![]).await.unwrap_err();
        assert!(matches!(err, WordhoardError::NotOpen), "got {err:?}");
    }

    #[tokio::test]
    async fn garbage_file_is_a_connection_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();
        let err = Database::open(&path, &StorageConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WordhoardError::Connection { .. }), "got {err:?}");
    }

    #[test]
    fn busy_and_locked_are_contention() {
        use rusqlite::ffi;
        let busy = rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_BUSY), None);
        let locked = rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_LOCKED), None);
        assert!(classify(busy).is_transient());
        assert!(classify(locked).is_transient());
        assert!(matches!(
            classify(rusqlite::Error::QueryReturnedNoRows),
            WordhoardError::Query { .. }
        ));
    }
}
