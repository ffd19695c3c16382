// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run installation of the packaged seed database.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wordhoard_config::StorageConfig;
use wordhoard_core::WordhoardError;

/// What [`Bootstrapper::ensure_seed_present`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The writable database already existed; nothing was touched.
    AlreadyPresent,
    /// The seed was copied into place.
    Copied { bytes: u64 },
    /// No seed is configured; the database will be created empty.
    NoSeedConfigured,
}

/// Copies the read-only seed database into writable storage.
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    database_path: PathBuf,
    seed_path: Option<PathBuf>,
}

impl Bootstrapper {
    pub fn new(database_path: impl Into<PathBuf>, seed_path: Option<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            seed_path,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            &config.database_path,
            config.seed_path.as_ref().map(PathBuf::from),
        )
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Make sure the writable database file exists.
    ///
    /// Idempotent: an existing database is never overwritten. The copy goes
    /// to a temporary sibling first and is renamed into place, so an
    /// interrupted copy never leaves a truncated database behind. Every
    /// failure is a fatal [`WordhoardError::Bootstrap`].
    pub async fn ensure_seed_present(&self) -> Result<BootstrapOutcome, WordhoardError> {
        let exists = tokio::fs::try_exists(&self.database_path)
            .await
            .map_err(|e| WordhoardError::bootstrap("cannot inspect database path", e))?;
        if exists {
            debug!(path = %self.database_path.display(), "database already present");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        if let Some(parent) = self.database_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                WordhoardError::bootstrap(
                    format!("cannot create data directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let Some(seed) = &self.seed_path else {
            debug!("no seed database configured, starting empty");
            return Ok(BootstrapOutcome::NoSeedConfigured);
        };

        let seed_present = tokio::fs::try_exists(seed).await.unwrap_or(false);
        if !seed_present {
            return Err(WordhoardError::Bootstrap {
                message: format!("seed database {} is missing", seed.display()),
                source: None,
            });
        }

        let staging = staging_path(&self.database_path);
        let bytes = match tokio::fs::copy(seed, &staging).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(WordhoardError::bootstrap(
                    format!("cannot copy seed into {}", staging.display()),
                    e,
                ));
            }
        };
        if let Err(e) = tokio::fs::rename(&staging, &self.database_path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(WordhoardError::bootstrap(
                format!("cannot move seed into {}", self.database_path.display()),
                e,
            ));
        }

        info!(
            seed = %seed.display(),
            path = %self.database_path.display(),
            bytes,
            "seed database installed"
        );
        Ok(BootstrapOutcome::Copied { bytes })
    }
}

fn staging_path(database_path: &Path) -> PathBuf {
    let mut name = database_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".seeding");
    database_path.with_file_name(name)
}
