// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wordhoard status` command implementation.
//!
//! Tries to bring the store up, then reports lifecycle state, health, file
//! locations, and word counts. A failed initialization is reported, not
//! returned, so `status` still prints something useful when the database is
//! broken.

use std::io::IsTerminal;
use std::path::Path;

use serde::Serialize;
use tracing::debug;
use wordhoard_config::WordhoardConfig;
use wordhoard_core::{HealthStatus, LifecycleState, StudyStore, WordhoardError};
use wordhoard_srs::SqliteStudyStore;

use crate::study::to_json;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: LifecycleState,
    pub last_error: Option<String>,
    pub health: String,
    pub database_path: String,
    pub database_exists: bool,
    pub seed_path: Option<String>,
    pub pending_operations: usize,
    pub total_words: Option<u64>,
    pub mastered_words: Option<u64>,
    pub due_count: Option<u64>,
}

fn describe_health(health: &HealthStatus) -> String {
    match health {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}"),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
    }
}

/// Run the `wordhoard status` command.
pub async fn run_status(
    store: &SqliteStudyStore,
    config: &WordhoardConfig,
    json: bool,
) -> Result<(), WordhoardError> {
    let response = gather(store, config).await;
    if json {
        println!("{}", to_json(&response)?);
    } else {
        print_status(&response, std::io::stdout().is_terminal());
    }
    Ok(())
}

async fn gather(store: &SqliteStudyStore, config: &WordhoardConfig) -> StatusResponse {
    if let Err(e) = store.initialize().await {
        debug!(error = %e, "initialization failed during status");
    }

    let snapshot = store.coordinator().state();
    let health = store.health_check().await;
    let stats = if snapshot.is_ready() {
        store.get_study_statistics().await.ok()
    } else {
        None
    };

    StatusResponse {
        state: snapshot.state,
        last_error: snapshot.last_error,
        health: describe_health(&health),
        database_path: config.storage.database_path.clone(),
        database_exists: Path::new(&config.storage.database_path).exists(),
        seed_path: config.storage.seed_path.clone(),
        pending_operations: store.coordinator().queue().len().await,
        total_words: stats.as_ref().map(|s| s.total_words),
        mastered_words: stats.as_ref().map(|s| s.mastered_words),
        due_count: stats.as_ref().map(|s| s.due_count),
    }
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  wordhoard status");
    println!("  {}", "-".repeat(35));

    let ready = status.state == LifecycleState::Ready;
    if use_color {
        use colored::Colorize;
        if ready {
            println!("    State:    {} {}", "✓".green(), status.state.to_string().green());
        } else {
            println!("    State:    {} {}", "✗".red(), status.state.to_string().red());
        }
    } else if ready {
        println!("    State:    [OK] {}", status.state);
    } else {
        println!("    State:    [FAIL] {}", status.state);
    }
    if let Some(error) = &status.last_error {
        println!("    Error:    {error}");
    }
    println!("    Health:   {}", status.health);

    let exists = if status.database_exists { "" } else { " (missing)" };
    println!("    Database: {}{exists}", status.database_path);
    match &status.seed_path {
        Some(seed) => println!("    Seed:     {seed}"),
        None => println!("    Seed:     (none)"),
    }

    if let (Some(total), Some(mastered), Some(due)) =
        (status.total_words, status.mastered_words, status.due_count)
    {
        println!("    Words:    {total} ({mastered} mastered, {due} due)");
    }
    println!();

    if !ready {
        println!("  Try: wordhoard recover");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordhoard_test_utils::TestHarness;

    #[test]
    fn health_is_described_in_words() {
        assert_eq!(describe_health(&HealthStatus::Healthy), "healthy");
        assert_eq!(
            describe_health(&HealthStatus::Unhealthy("locked".into())),
            "unhealthy: locked"
        );
    }

    #[tokio::test]
    async fn ready_store_reports_counts() {
        let harness = TestHarness::builder()
            .with_words(&["abandon", "ability", "able"])
            .build()
            .unwrap();

        let status = gather(&harness.store, &harness.config).await;
        assert_eq!(status.state, LifecycleState::Ready);
        assert_eq!(status.health, "healthy");
        assert!(status.database_exists);
        assert_eq!(status.total_words, Some(3));
        assert_eq!(status.mastered_words, Some(0));
        assert_eq!(status.pending_operations, 0);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "ready");
        harness.store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn failed_initialization_is_reported() {
        let harness = TestHarness::builder()
            .with_words(&["abandon"])
            .configure(|config| {
                config.storage.seed_path = Some("/nonexistent/wordhoard-seed.db".into());
                config.init.max_attempts = 1;
            })
            .build()
            .unwrap();

        let status = gather(&harness.store, &harness.config).await;
        assert_eq!(status.state, LifecycleState::Failed);
        assert!(status.last_error.is_some());
        assert!(status.health.starts_with("unhealthy"));
        assert_eq!(status.total_words, None);
    }
}
