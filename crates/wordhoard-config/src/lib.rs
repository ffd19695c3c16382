// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Wordhoard storage core.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `WORDHOARD_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use wordhoard_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Database: {}", config.storage.database_path);
//! ```

use std::path::{Path, PathBuf};

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    BackoffKind, InitConfig, LoggingConfig, QueueConfig, StorageConfig, StudyConfig,
    WordhoardConfig,
};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors become diagnostics with source spans; a config that parses
/// is then checked by [`validation::validate_config`].
pub fn load_and_validate() -> Result<WordhoardConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load a specific config file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<WordhoardConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<WordhoardConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<WordhoardConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<WordhoardConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Config files consulted by [`load_config`], most specific first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![std::env::current_dir()
        .map(|d| d.join("wordhoard.toml"))
        .unwrap_or_else(|_| PathBuf::from("wordhoard.toml"))];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("wordhoard/wordhoard.toml"));
    }
    paths.push(PathBuf::from("/etc/wordhoard/wordhoard.toml"));
    paths
}

/// Contents of every config file that exists, for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    config_search_paths()
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
