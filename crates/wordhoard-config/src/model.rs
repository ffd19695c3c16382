// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Wordhoard storage core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Wordhoard configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WordhoardConfig {
    /// Database location, seed file, and connection tuning.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Operation queue retry behavior.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Initialization retry behavior.
    #[serde(default)]
    pub init: InitConfig,

    /// Study-set selection settings.
    #[serde(default)]
    pub study: StudyConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the writable SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Packaged, pre-populated database copied into place on first run.
    /// `None` creates an empty database instead.
    #[serde(default)]
    pub seed_path: Option<String>,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Page cache size in KiB.
    #[serde(default = "default_cache_size_kib")]
    pub cache_size_kib: u32,

    /// How long SQLite itself waits on a held lock before reporting busy.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            seed_path: None,
            wal_mode: default_wal_mode(),
            cache_size_kib: default_cache_size_kib(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("wordhoard").join("wordhoard.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "wordhoard.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_cache_size_kib() -> u32 {
    8192
}

fn default_busy_timeout_ms() -> u64 {
    2000
}

/// Backoff shape between retries of a locked operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// `base * attempt`.
    Linear,
    /// `base * 2^(attempt - 1)`.
    Exponential,
}

/// Operation queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Attempts per queued operation, counting the first.
    #[serde(default = "default_queue_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// How the retry delay grows.
    #[serde(default = "default_backoff")]
    pub backoff: BackoffKind,

    /// Pause between consecutive queued operations.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_queue_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            backoff: default_backoff(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl QueueConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn default_queue_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_backoff() -> BackoffKind {
    BackoffKind::Exponential
}

fn default_settle_delay_ms() -> u64 {
    10
}

/// Initialization retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfig {
    /// Whole-sequence attempts (bootstrap, open, migrate, smoke test).
    #[serde(default = "default_init_attempts")]
    pub max_attempts: u32,

    /// Delay unit between attempts; attempt `n` waits `n * retry_delay_ms`.
    #[serde(default = "default_init_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Poll interval used by `wait_for_ready`.
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_ms: u64,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_init_attempts(),
            retry_delay_ms: default_init_retry_delay_ms(),
            ready_poll_ms: default_ready_poll_ms(),
        }
    }
}

impl InitConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms)
    }
}

fn default_init_attempts() -> u32 {
    3
}

fn default_init_retry_delay_ms() -> u64 {
    500
}

fn default_ready_poll_ms() -> u64 {
    100
}

/// Study-set selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Cards per session when the caller does not say.
    #[serde(default = "default_study_limit")]
    pub default_limit: u32,

    /// Share of a mixed session drawn from the review pool, in percent.
    #[serde(default = "default_review_share_percent")]
    pub review_share_percent: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            default_limit: default_study_limit(),
            review_share_percent: default_review_share_percent(),
        }
    }
}

fn default_study_limit() -> u32 {
    20
}

fn default_review_share_percent() -> u32 {
    70
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WordhoardConfig::default();
        assert!(config.storage.wal_mode);
        assert!(config.storage.seed_path.is_none());
        assert_eq!(config.queue.max_attempts, 3);
        assert_eq!(config.queue.backoff, BackoffKind::Exponential);
        assert_eq!(config.init.max_attempts, 3);
        assert_eq!(config.init.retry_delay(), Duration::from_millis(500));
        assert_eq!(config.study.review_share_percent, 70);
        assert_eq!(config.logging.log_level, "info");
    }

    #[test]
    fn backoff_parses_lowercase() {
        let config: WordhoardConfig = toml::from_str(
            r#"
[queue]
backoff = "linear"
"#,
        )
        .unwrap();
        assert_eq!(config.queue.backoff, BackoffKind::Linear);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let result = toml::from_str::<WordhoardConfig>("[telegram]\nbot_token = \"x\"\n");
        assert!(result.is_err());
    }
}
