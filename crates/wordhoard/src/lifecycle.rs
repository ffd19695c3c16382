// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wordhoard init` and `wordhoard recover`.

use tracing::info;
use wordhoard_core::{StudyStore, WordhoardError};
use wordhoard_srs::SqliteStudyStore;

/// Run the `wordhoard init` command.
///
/// Bootstraps the seed, opens the database, and migrates the schema.
pub async fn run_init(store: &SqliteStudyStore) -> Result<(), WordhoardError> {
    store.initialize().await?;
    let stats = store.get_study_statistics().await?;
    println!(
        "ready: {} words ({} mastered) in {}",
        stats.total_words,
        stats.mastered_words,
        store.coordinator().database()?.path().display()
    );
    Ok(())
}

/// Run the `wordhoard recover` command.
///
/// Rejects anything still queued, drops the handle, and initializes from
/// scratch.
pub async fn run_recover(store: &SqliteStudyStore) -> Result<(), WordhoardError> {
    store.force_reset().await?;
    info!("connection reset, reinitializing");
    store.initialize().await?;
    println!("recovered: {}", store.coordinator().state().state);
    Ok(())
}
