// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle bus: fan-out of connection state changes.
//!
//! Two ways to observe: callback listeners registered with
//! [`LifecycleBus::subscribe`], and a `tokio::sync::watch` receiver that
//! always holds the latest snapshot.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;
use tracing::warn;
use wordhoard_core::{LifecycleListener, LifecycleSnapshot, Subscription};

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Arc<LifecycleListener>>,
}

/// Publishes [`LifecycleSnapshot`]s to every subscriber.
pub struct LifecycleBus {
    state: watch::Sender<LifecycleSnapshot>,
    listeners: Arc<Mutex<Listeners>>,
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleBus {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleSnapshot::closed());
        Self {
            state,
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// The latest published snapshot.
    pub fn current(&self) -> LifecycleSnapshot {
        self.state.borrow().clone()
    }

    /// A receiver that always observes the latest snapshot.
    pub fn watch(&self) -> watch::Receiver<LifecycleSnapshot> {
        self.state.subscribe()
    }

    /// Record `snapshot` and deliver it to every listener.
    ///
    /// Listeners run outside the registry lock, so they may subscribe or
    /// unsubscribe from inside the callback. A panicking listener is logged
    /// and skipped.
    pub fn publish(&self, snapshot: LifecycleSnapshot) {
        self.record(snapshot.clone());
        self.deliver(&snapshot);
    }

    /// Make `snapshot` the current state without calling listeners.
    ///
    /// Safe to call under a caller's lock; follow it with
    /// [`Self::deliver`] once that lock is released.
    pub fn record(&self, snapshot: LifecycleSnapshot) {
        self.state.send_replace(snapshot);
    }

    /// Call every listener with `snapshot`.
    pub fn deliver(&self, snapshot: &LifecycleSnapshot) {
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            notify(&listener, snapshot);
        }
    }

    /// Register `listener` and call it once with the current snapshot.
    pub fn subscribe(&self, listener: LifecycleListener) -> Subscription {
        let listener = Arc::new(listener);
        let id = {
            let mut registry = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.insert(id, listener.clone());
            id
        };
        notify(&listener, &self.current());

        let registry: Weak<Mutex<Listeners>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entries
                    .remove(&id);
            }
        })
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

fn notify(listener: &LifecycleListener, snapshot: &LifecycleSnapshot) {
    if catch_unwind(AssertUnwindSafe(|| listener(snapshot))).is_err() {
        warn!(state = %snapshot.state, "lifecycle listener panicked");
    }
}
