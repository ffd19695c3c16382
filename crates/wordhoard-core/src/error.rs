// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Wordhoard storage core.

use std::sync::Arc;

use thiserror::Error;

/// The primary error type returned by every caller-visible Wordhoard operation.
///
/// Retry decisions are made on the typed discriminants exposed by
/// [`is_transient`](Self::is_transient) and [`is_lock_related`](Self::is_lock_related),
/// never on message text.
#[derive(Debug, Error)]
pub enum WordhoardError {
    /// Configuration errors (invalid TOML, missing fields, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// The packaged seed database could not be installed. Fatal, never retried.
    #[error("bootstrap failed: {message}")]
    Bootstrap {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The database file could not be opened (I/O, corrupt file, not a database).
    #[error("connection error: {source}")]
    Connection {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Additive schema migration failed.
    #[error("schema migration failed: {message}")]
    Schema {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The single-writer store reported SQLITE_BUSY or SQLITE_LOCKED.
    #[error("database is locked: {message}")]
    LockContention { message: String },

    /// Lock contention persisted through every retry attempt.
    #[error("database still locked after {attempts} attempts: {message}")]
    LockTimeout { attempts: u32, message: String },

    /// An operation was attempted before the store reached `Ready`.
    #[error("database is not ready -- call initialize() or wait_for_ready() first")]
    NotReady,

    /// The connection handle has been closed.
    #[error("database handle is not open")]
    NotOpen,

    /// Malformed query or constraint violation. Never retried.
    #[error("query failed: {source}")]
    Query {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The operation was cancelled by a forced reset before it ran.
    #[error("operation cancelled: database was reset")]
    Reset,

    /// Initialization gave up; shared by every caller awaiting the same attempt.
    #[error("initialization failed after {attempts} attempt(s): {source}")]
    Initialization {
        attempts: u32,
        source: Arc<WordhoardError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WordhoardError {
    /// Returns true when the error is transient lock contention worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, WordhoardError::LockContention { .. })
    }

    /// Returns true when the error was caused by the store being locked,
    /// including contention that already exhausted its retries.
    pub fn is_lock_related(&self) -> bool {
        match self {
            WordhoardError::LockContention { .. } | WordhoardError::LockTimeout { .. } => true,
            WordhoardError::Initialization { source, .. } => source.is_lock_related(),
            _ => false,
        }
    }

    /// Returns true for errors that must abort initialization without retrying.
    pub fn is_fatal(&self) -> bool {
        match self {
            WordhoardError::Bootstrap { .. } | WordhoardError::Config(_) => true,
            WordhoardError::Initialization { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Shorthand for a bootstrap error with an underlying cause.
    pub fn bootstrap(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        WordhoardError::Bootstrap {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a schema error with an underlying cause.
    pub fn schema(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        WordhoardError::Schema {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
