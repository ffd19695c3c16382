// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks ranges and relationships serde cannot express, such as a non-empty
//! database path or a review share that is a real percentage.

use std::path::Path;

use crate::diagnostic::ConfigError;
use crate::model::WordhoardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &WordhoardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let storage = &config.storage;
    if storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }
    if let Some(seed) = &storage.seed_path {
        if seed.trim().is_empty() {
            fail("storage.seed_path must not be empty when set".to_string());
        } else if Path::new(seed) == Path::new(&storage.database_path) {
            fail(format!(
                "storage.seed_path and storage.database_path both point at `{seed}`"
            ));
        }
    }
    if storage.cache_size_kib == 0 {
        fail("storage.cache_size_kib must be at least 1".to_string());
    }

    if config.queue.max_attempts == 0 {
        fail("queue.max_attempts must be at least 1".to_string());
    }
    if config.init.max_attempts == 0 {
        fail("init.max_attempts must be at least 1".to_string());
    }
    if config.init.ready_poll_ms == 0 {
        fail("init.ready_poll_ms must be at least 1".to_string());
    }

    if config.study.review_share_percent > 100 {
        fail(format!(
            "study.review_share_percent must be between 0 and 100, got {}",
            config.study.review_share_percent
        ));
    }
    if config.study.default_limit == 0 {
        fail("study.default_limit must be at least 1".to_string());
    }

    let level = config.logging.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.log_level `{}` is not one of {}",
            config.logging.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&WordhoardConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = WordhoardConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn seed_equal_to_database_fails_validation() {
        let mut config = WordhoardConfig::default();
        config.storage.database_path = "/tmp/words.db".to_string();
        config.storage.seed_path = Some("/tmp/words.db".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "seed_path"));
    }

    #[test]
    fn zero_attempts_fail_validation() {
        let mut config = WordhoardConfig::default();
        config.queue.max_attempts = 0;
        config.init.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "queue.max_attempts"));
        assert!(has_message(&errors, "init.max_attempts"));
    }

    #[test]
    fn review_share_over_100_fails_validation() {
        let mut config = WordhoardConfig::default();
        config.study.review_share_percent = 120;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "review_share_percent"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = WordhoardConfig::default();
        config.logging.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log_level"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = WordhoardConfig::default();
        config.storage.database_path = String::new();
        config.study.default_limit = 0;
        config.logging.log_level = "loud".to_string();
        assert_eq!(validate_config(&config).unwrap_err().len(), 3);
    }

    #[test]
    fn uppercase_log_level_is_accepted() {
        let mut config = WordhoardConfig::default();
        config.logging.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
