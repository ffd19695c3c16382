// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Wordhoard.
//!
//! One WAL-mode SQLite handle driven through `tokio-rusqlite`, a FIFO
//! operation queue that keeps writes from colliding, first-run seed
//! bootstrap, additive schema migration, and the coordinator that ties them
//! into a retrying, observable initialization lifecycle.

pub mod bootstrap;
pub mod coordinator;
pub mod database;
pub mod events;
pub mod queries;
pub mod queue;
pub mod retry;
pub mod schema;

pub use bootstrap::{BootstrapOutcome, Bootstrapper};
pub use coordinator::InitializationCoordinator;
pub use database::Database;
pub use events::LifecycleBus;
pub use queries::study::ReviewOrder;
pub use queue::OperationQueue;
pub use retry::RetryPolicy;
pub use schema::{MigrationReport, SchemaMigrator};
