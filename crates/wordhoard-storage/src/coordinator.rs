// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle: single-flight initialization, recovery, and shutdown.
//!
//! An initialization attempt runs bootstrap, open, schema migration, and a
//! smoke test, retrying the whole sequence up to `init.max_attempts` times.
//! Concurrent `initialize()` callers share one attempt. The attempt is
//! spawned, so it keeps going even if every caller stops waiting.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use wordhoard_config::{InitConfig, StorageConfig, WordhoardConfig};
use wordhoard_core::{
    HealthStatus, LifecycleListener, LifecycleSnapshot, LifecycleState, Subscription,
    WordhoardError,
};

use crate::bootstrap::Bootstrapper;
use crate::database::Database;
use crate::events::LifecycleBus;
use crate::queue::OperationQueue;
use crate::schema::SchemaMigrator;

/// Why a shared initialization attempt gave up.
#[derive(Debug, Clone)]
struct InitFailure {
    attempts: u32,
    error: Arc<WordhoardError>,
}

type InitFuture = Shared<BoxFuture<'static, Result<(), InitFailure>>>;

#[derive(Default)]
struct Slot {
    database: Option<Arc<Database>>,
    inflight: Option<InitFuture>,
    /// Bumped by every reset; an attempt started under an older generation
    /// must not install its handle.
    generation: u64,
}

struct Inner {
    storage: StorageConfig,
    init: InitConfig,
    queue: OperationQueue,
    bus: LifecycleBus,
    slot: Mutex<Slot>,
}

/// Owns the single database handle and its lifecycle.
///
/// Cloning is cheap; clones share the same handle, queue, and subscribers.
#[derive(Clone)]
pub struct InitializationCoordinator {
    inner: Arc<Inner>,
}

impl InitializationCoordinator {
    pub fn new(storage: StorageConfig, init: InitConfig, queue: OperationQueue) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                init,
                queue,
                bus: LifecycleBus::new(),
                slot: Mutex::new(Slot::default()),
            }),
        }
    }

    pub fn from_config(config: &WordhoardConfig) -> Self {
        Self::new(
            config.storage.clone(),
            config.init.clone(),
            OperationQueue::from_config(&config.queue),
        )
    }

    /// Bring the store to `Ready`.
    ///
    /// Returns at once when already ready and joins the in-flight attempt
    /// when one is running. Every caller sharing a failed attempt receives
    /// the same [`WordhoardError::Initialization`].
    pub async fn initialize(&self) -> Result<(), WordhoardError> {
        let attempt = {
            let mut slot = self.inner.lock_slot();
            // The handle and `Ready` are installed under this lock together.
            if slot.database.is_some() {
                return Ok(());
            }
            match &slot.inflight {
                Some(inflight) => inflight.clone(),
                None => {
                    let inner = self.inner.clone();
                    let generation = slot.generation;
                    let handle = tokio::spawn(async move { inner.run_attempts(generation).await });
                    let inflight = async move {
                        handle.await.unwrap_or_else(|e| {
                            Err(InitFailure {
                                attempts: 0,
                                error: Arc::new(WordhoardError::Internal(format!(
                                    "initialization task aborted: {e}"
                                ))),
                            })
                        })
                    }
                    .boxed()
                    .shared();
                    slot.inflight = Some(inflight.clone());
                    inflight
                }
            }
        };

        attempt
            .await
            .map_err(|failure| WordhoardError::Initialization {
                attempts: failure.attempts,
                source: failure.error,
            })
    }

    pub fn is_ready(&self) -> bool {
        self.inner.bus.current().is_ready()
    }

    /// The latest lifecycle snapshot.
    pub fn state(&self) -> LifecycleSnapshot {
        self.inner.bus.current()
    }

    /// Start initialization if needed and wait up to `timeout` for `Ready`.
    pub async fn wait_for_ready(&self, timeout: Duration) -> bool {
        if self.is_ready() {
            return true;
        }
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.initialize().await {
                debug!(error = %e, "initialization triggered by wait_for_ready failed");
            }
        });

        let poll = self.inner.init.ready_poll();
        tokio::time::timeout(timeout, async {
            while !self.is_ready() {
                tokio::time::sleep(poll).await;
            }
        })
        .await
        .is_ok()
    }

    /// Register a listener; it is called with the current state right away.
    pub fn subscribe(&self, listener: LifecycleListener) -> Subscription {
        self.inner.bus.subscribe(listener)
    }

    /// A receiver that always observes the latest lifecycle snapshot.
    pub fn watch_state(&self) -> watch::Receiver<LifecycleSnapshot> {
        self.inner.bus.watch()
    }

    /// Reject queued operations, close the handle, and return to `Closed`.
    ///
    /// Any in-flight attempt is invalidated; it will not install its handle.
    pub async fn force_reset(&self) -> Result<(), WordhoardError> {
        let rejected = self.inner.close_handle().await;
        warn!(rejected, "store reset");
        Ok(())
    }

    /// Checkpoint the WAL, close the handle, and return to `Closed`.
    pub async fn shutdown(&self) -> Result<(), WordhoardError> {
        let rejected = self.inner.close_handle().await;
        info!(rejected, "store shut down");
        Ok(())
    }

    /// Probe the store without changing its state.
    pub async fn health_check(&self) -> HealthStatus {
        let snapshot = self.state();
        match snapshot.state {
            LifecycleState::Closed => HealthStatus::Unhealthy("store is not initialized".into()),
            LifecycleState::Initializing => {
                HealthStatus::Degraded(format!("initializing (attempt {})", snapshot.attempt))
            }
            LifecycleState::Failed => HealthStatus::Unhealthy(
                snapshot
                    .last_error
                    .unwrap_or_else(|| "initialization failed".into()),
            ),
            LifecycleState::Ready => {
                let probe = self
                    .run("health_check", |db| async move {
                        db.call(|conn| conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0)))
                            .await
                    })
                    .await;
                match probe {
                    Ok(_) => HealthStatus::Healthy,
                    Err(e) => HealthStatus::Unhealthy(e.to_string()),
                }
            }
        }
    }

    /// The open handle, or [`WordhoardError::NotReady`].
    pub fn database(&self) -> Result<Arc<Database>, WordhoardError> {
        self.inner.current_database()
    }

    pub fn queue(&self) -> &OperationQueue {
        &self.inner.queue
    }

    /// Run `op` through the operation queue against the open handle.
    ///
    /// Fails with [`WordhoardError::NotReady`] before initialization. The
    /// handle is looked up again for each retry, so an operation queued
    /// across a reset never touches a stale handle.
    pub async fn run<F, Fut, T>(&self, label: &str, mut op: F) -> Result<T, WordhoardError>
    where
        F: FnMut(Arc<Database>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, WordhoardError>> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.current_database()?;
        let inner = self.inner.clone();
        self.inner
            .queue
            .enqueue(label, move || {
                let next = inner.current_database().map(&mut op);
                async move { next?.await }
            })
            .await
    }
}

impl Inner {
    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_database(&self) -> Result<Arc<Database>, WordhoardError> {
        self.lock_slot()
            .database
            .clone()
            .ok_or(WordhoardError::NotReady)
    }

    /// Apply `change` to the slot and record `snapshot` under one lock,
    /// provided `generation` is still current; listeners are called after
    /// the lock is released. Returns false for a superseded generation.
    fn transition(
        &self,
        generation: u64,
        snapshot: LifecycleSnapshot,
        change: impl FnOnce(&mut Slot),
    ) -> bool {
        {
            let mut slot = self.lock_slot();
            if slot.generation != generation {
                return false;
            }
            change(&mut slot);
            self.bus.record(snapshot.clone());
        }
        self.bus.deliver(&snapshot);
        true
    }

    async fn run_attempts(self: Arc<Self>, generation: u64) -> Result<(), InitFailure> {
        let max_attempts = self.init.max_attempts.max(1);
        let mut attempt = 1;
        let last_error = loop {
            let started = self.transition(
                generation,
                LifecycleSnapshot {
                    state: LifecycleState::Initializing,
                    last_error: None,
                    attempt,
                },
                |_| {},
            );
            if !started {
                return Err(reset_failure(attempt - 1));
            }
            debug!(attempt, max_attempts, "initialization attempt");

            let error = match self.attempt_once().await {
                Ok(db) => return self.install(generation, attempt, db).await,
                Err(e) => e,
            };

            if error.is_fatal() {
                error!(attempt, error = %error, "initialization failed fatally");
                break error;
            }
            if attempt >= max_attempts {
                break error;
            }
            warn!(attempt, max_attempts, error = %error, "initialization attempt failed");
            if error.is_lock_related() {
                let rejected = self.queue.reset().await;
                debug!(rejected, "connection reset after lock failure");
            }
            tokio::time::sleep(self.init.retry_delay().saturating_mul(attempt)).await;
            attempt += 1;
        };

        let failed = self.transition(
            generation,
            LifecycleSnapshot {
                state: LifecycleState::Failed,
                last_error: Some(last_error.to_string()),
                attempt,
            },
            |slot| slot.inflight = None,
        );
        if !failed {
            return Err(reset_failure(attempt));
        }
        error!(attempts = attempt, error = %last_error, "initialization gave up");
        Err(InitFailure {
            attempts: attempt,
            error: Arc::new(last_error),
        })
    }

    /// Bootstrap, open, migrate, and smoke-test once. The handle is closed
    /// again when anything after opening fails.
    async fn attempt_once(&self) -> Result<Database, WordhoardError> {
        Bootstrapper::from_config(&self.storage)
            .ensure_seed_present()
            .await?;
        let db = Database::open(&self.storage.database_path, &self.storage).await?;

        let checked = async {
            SchemaMigrator::new().ensure_schema(&db).await?;
            db.call(|conn| conn.query_row("SELECT COUNT(*) FROM words", [], |r| r.get::<_, i64>(0)))
                .await
        }
        .await;

        match checked {
            Ok(words) => {
                debug!(words, "smoke test passed");
                Ok(db)
            }
            Err(e) => {
                if let Err(close_err) = db.close().await {
                    debug!(error = %close_err, "closing failed handle");
                }
                Err(e)
            }
        }
    }

    async fn install(
        self: &Arc<Self>,
        generation: u64,
        attempt: u32,
        db: Database,
    ) -> Result<(), InitFailure> {
        let db = Arc::new(db);
        let installed = self.transition(
            generation,
            LifecycleSnapshot {
                state: LifecycleState::Ready,
                last_error: None,
                attempt,
            },
            |slot| {
                slot.database = Some(db.clone());
                slot.inflight = None;
            },
        );
        if !installed {
            if let Err(e) = db.close().await {
                debug!(error = %e, "closing handle from a superseded attempt");
            }
            return Err(reset_failure(attempt));
        }
        info!(attempt, path = %db.path().display(), "store ready");

        // Fire and forget: planner statistics are a nicety, not a requirement.
        let queue = self.queue.clone();
        tokio::spawn(async move {
            let optimized = queue
                .enqueue("optimize", move || {
                    let db = db.clone();
                    async move { db.call(|conn| conn.execute_batch("PRAGMA optimize;")).await }
                })
                .await;
            if let Err(e) = optimized {
                debug!(error = %e, "PRAGMA optimize skipped");
            }
        });
        Ok(())
    }

    /// Reject queued operations, invalidate any in-flight attempt, close the
    /// handle, and publish `Closed`. Returns the number of rejected operations.
    async fn close_handle(&self) -> usize {
        let rejected = self.queue.reset().await;
        let database = {
            let mut slot = self.lock_slot();
            slot.generation += 1;
            slot.inflight = None;
            self.bus.record(LifecycleSnapshot::closed());
            slot.database.take()
        };
        if let Some(db) = database
            && let Err(e) = db.close().await
        {
            warn!(error = %e, "closing database handle failed");
        }
        self.bus.deliver(&LifecycleSnapshot::closed());
        rejected
    }
}

fn reset_failure(attempts: u32) -> InitFailure {
    InitFailure {
        attempts,
        error: Arc::new(WordhoardError::Reset),
    }
}
