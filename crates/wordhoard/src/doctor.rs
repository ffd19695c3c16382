// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wordhoard doctor` command implementation.
//!
//! Runs read-only diagnostic checks against the configured seed and study
//! database. Nothing here installs, migrates, or repairs; `wordhoard init`
//! and `wordhoard recover` do that.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use wordhoard_config::WordhoardConfig;
use wordhoard_core::WordhoardError;
use wordhoard_storage::queries::diagnostics;
use wordhoard_storage::{Database, SchemaMigrator};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

fn finish(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        status,
        message: message.into(),
        duration: start.elapsed(),
    }
}

/// Run the `wordhoard doctor` command.
///
/// With `--plain`, disables colored output.
pub async fn run_doctor(
    config: &WordhoardConfig,
    config_path: Option<&PathBuf>,
    plain: bool,
) -> Result<(), WordhoardError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect(config, config_path).await;

    println!();
    println!("  wordhoard doctor");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

/// Run every check in display order.
async fn collect(config: &WordhoardConfig, config_path: Option<&PathBuf>) -> Vec<CheckResult> {
    let db_path = Path::new(&config.storage.database_path);
    let mut results = vec![
        check_config(config_path),
        check_seed(config.storage.seed_path.as_deref(), db_path),
    ];

    let start = Instant::now();
    if !db_path.exists() {
        results.push(finish(
            "Database",
            CheckStatus::Warn,
            format!("not found: {} (run `wordhoard init`)", db_path.display()),
            start,
        ));
        return results;
    }

    let db = match Database::open(db_path, &config.storage).await {
        Ok(db) => db,
        Err(e) => {
            results.push(finish(
                "Database",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            ));
            return results;
        }
    };
    results.push(finish("Database", CheckStatus::Pass, "opened", start));

    results.push(check_schema(&db).await);
    results.push(check_integrity(&db).await);
    results.push(check_progress(&db).await);
    if let Err(e) = db.close().await {
        tracing::debug!(error = %e, "closing database after doctor checks failed");
    }
    results.push(check_disk(db_path));
    results
}

/// Check configuration loads without errors.
fn check_config(config_path: Option<&PathBuf>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => wordhoard_config::load_and_validate_path(path),
        None => wordhoard_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => finish("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => finish(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the seed file is present when first-run install still needs it.
fn check_seed(seed_path: Option<&str>, db_path: &Path) -> CheckResult {
    let start = Instant::now();
    let installed = db_path.exists();
    match seed_path {
        None if installed => finish("Seed", CheckStatus::Pass, "not configured", start),
        None => finish(
            "Seed",
            CheckStatus::Warn,
            "not configured; init will create an empty database",
            start,
        ),
        Some(seed) if Path::new(seed).is_file() => {
            finish("Seed", CheckStatus::Pass, format!("found: {seed}"), start)
        }
        Some(seed) if installed => finish(
            "Seed",
            CheckStatus::Pass,
            format!("missing: {seed} (database already installed)"),
            start,
        ),
        Some(seed) => finish(
            "Seed",
            CheckStatus::Fail,
            format!("missing: {seed} (init cannot install the word list)"),
            start,
        ),
    }
}

/// Check the live schema against what the app expects.
async fn check_schema(db: &Database) -> CheckResult {
    let start = Instant::now();
    match SchemaMigrator::new().pending(db).await {
        Ok(report) if report.is_noop() => finish("Schema", CheckStatus::Pass, "up to date", start),
        Ok(report) => {
            let mut missing = report.created_tables.clone();
            missing.extend(report.added_columns.iter().cloned());
            finish(
                "Schema",
                CheckStatus::Warn,
                format!("{} (will be added on next start)", missing.join(", ")),
                start,
            )
        }
        Err(e) => finish(
            "Schema",
            CheckStatus::Fail,
            format!("inspection failed: {e}"),
            start,
        ),
    }
}

/// SQLite integrity check.
async fn check_integrity(db: &Database) -> CheckResult {
    let start = Instant::now();
    match diagnostics::integrity_check(db).await {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            finish("DB integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(rows) => finish(
            "DB integrity",
            CheckStatus::Fail,
            format!("{} issue(s) found", rows.len()),
            start,
        ),
        Err(e) => finish(
            "DB integrity",
            CheckStatus::Fail,
            format!("check failed: {e}"),
            start,
        ),
    }
}

/// Check learning progress rows against the word list.
async fn check_progress(db: &Database) -> CheckResult {
    let start = Instant::now();
    let orphans = match diagnostics::orphaned_stats(db).await {
        Ok(n) => n,
        // A seed that was never migrated has no learning_stats table yet.
        Err(_) => return finish("Progress", CheckStatus::Pass, "no progress recorded", start),
    };
    if orphans > 0 {
        return finish(
            "Progress",
            CheckStatus::Warn,
            format!("{orphans} stat(s) reference missing words"),
            start,
        );
    }
    match diagnostics::top_level_unmastered(db).await {
        Ok(0) => finish("Progress", CheckStatus::Pass, "consistent", start),
        Ok(n) => finish(
            "Progress",
            CheckStatus::Pass,
            format!("consistent ({n} top-level word(s) not marked mastered)"),
            start,
        ),
        Err(e) => finish(
            "Progress",
            CheckStatus::Fail,
            format!("check failed: {e}"),
            start,
        ),
    }
}

/// Report database and WAL size.
fn check_disk(db_path: &Path) -> CheckResult {
    let start = Instant::now();
    let size = |path: &Path| std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let mut wal = db_path.as_os_str().to_owned();
    wal.push("-wal");

    let db_mb = size(db_path) as f64 / (1024.0 * 1024.0);
    let wal_mb = size(Path::new(&wal)) as f64 / (1024.0 * 1024.0);
    finish(
        "Disk",
        CheckStatus::Pass,
        format!("DB size: {db_mb:.1} MB, WAL: {wal_mb:.1} MB"),
        start,
    )
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<16} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordhoard_core::StudyStore;
    use wordhoard_test_utils::TestHarness;

    fn status_of<'a>(results: &'a [CheckResult], name: &str) -> &'a CheckResult {
        results
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no check named {name}"))
    }

    #[test]
    fn plain_line_has_tag_and_message() {
        let result = CheckResult {
            name: "Schema".to_string(),
            status: CheckStatus::Warn,
            message: "words.mastered (will be added on next start)".to_string(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.starts_with("    [WARN] Schema"));
        assert!(line.ends_with("(3ms)"));
    }

    #[test]
    fn missing_seed_fails_only_before_install() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("wordhoard.db");
        let seed = dir.path().join("seed.db");
        let seed = seed.to_str().unwrap();

        assert_eq!(check_seed(Some(seed), &db).status, CheckStatus::Fail);
        std::fs::write(&db, b"").unwrap();
        assert_eq!(check_seed(Some(seed), &db).status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn uninstalled_database_warns_and_stops() {
        let harness = TestHarness::builder().with_words(&["abandon"]).build().unwrap();
        let config_file = harness.write_config_file().unwrap();

        let results = collect(&harness.config, Some(&config_file)).await;
        assert_eq!(status_of(&results, "Configuration").status, CheckStatus::Pass);
        assert_eq!(status_of(&results, "Seed").status, CheckStatus::Pass);
        let db = status_of(&results, "Database");
        assert_eq!(db.status, CheckStatus::Warn);
        assert!(db.message.contains("wordhoard init"));
        assert!(results.iter().all(|r| r.name != "Schema"));
        assert!(!harness.database_path().exists());
    }

    #[tokio::test]
    async fn installed_database_passes_every_check() {
        let harness = TestHarness::builder()
            .with_words(&["abandon", "ability"])
            .build()
            .unwrap()
            .ready()
            .await
            .unwrap();
        harness.store.shutdown().await.unwrap();
        let config_file = harness.write_config_file().unwrap();

        let results = collect(&harness.config, Some(&config_file)).await;
        for result in &results {
            assert_eq!(result.status, CheckStatus::Pass, "{result:?}");
        }
        assert_eq!(status_of(&results, "Schema").message, "up to date");
    }

    #[tokio::test]
    async fn raw_seed_copy_reports_pending_schema() {
        let harness = TestHarness::builder().with_words(&["abandon"]).build().unwrap();
        std::fs::create_dir_all(harness.database_path().parent().unwrap()).unwrap();
        std::fs::copy(harness.seed_path().unwrap(), harness.database_path()).unwrap();

        let results = collect(&harness.config, None).await;
        let schema = status_of(&results, "Schema");
        assert_eq!(schema.status, CheckStatus::Warn);
        assert!(schema.message.contains("learning_stats"));
        assert!(schema.message.contains("words.mastered"));
        assert_eq!(status_of(&results, "Progress").message, "no progress recorded");
    }
}
