// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wordhoard.toml` > `~/.config/wordhoard/wordhoard.toml` >
//! `/etc/wordhoard/wordhoard.toml` with environment variable overrides via `WORDHOARD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WordhoardConfig;

/// Sections whose names prefix environment variable keys.
const SECTIONS: &[&str] = &["storage", "queue", "init", "study", "logging"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wordhoard/wordhoard.toml` (system-wide)
/// 3. `~/.config/wordhoard/wordhoard.toml` (user XDG config)
/// 4. `./wordhoard.toml` (local directory)
/// 5. `WORDHOARD_*` environment variables
pub fn load_config() -> Result<WordhoardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<WordhoardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WordhoardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WordhoardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WordhoardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WordhoardConfig::default()))
        .merge(Toml::file("/etc/wordhoard/wordhoard.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("wordhoard/wordhoard.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("wordhoard.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `WORDHOARD_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("WORDHOARD_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_only_at_section() {
        assert_eq!(
            map_env_key("storage_database_path"),
            "storage.database_path"
        );
        assert_eq!(map_env_key("queue_max_attempts"), "queue.max_attempts");
        assert_eq!(
            map_env_key("study_review_share_percent"),
            "study.review_share_percent"
        );
        assert_eq!(map_env_key("init_retry_delay_ms"), "init.retry_delay_ms");
    }

    #[test]
    fn unknown_env_keys_pass_through() {
        assert_eq!(map_env_key("nonsense"), "nonsense");
    }
}
