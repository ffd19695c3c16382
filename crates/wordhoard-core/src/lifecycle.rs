// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle state published by the initialization coordinator.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Connection lifecycle.
///
/// `Closed -> Initializing -> Ready`, `Initializing -> Failed` once retries are
/// exhausted, and `Failed -> Initializing` on the next attempt or a reset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleState {
    Closed,
    Initializing,
    Ready,
    Failed,
}

/// A state-change message delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    pub state: LifecycleState,
    /// Message of the error that caused the last `Failed` transition.
    pub last_error: Option<String>,
    /// Attempt number within the current initialization (0 when idle).
    pub attempt: u32,
}

impl LifecycleSnapshot {
    pub fn closed() -> Self {
        Self {
            state: LifecycleState::Closed,
            last_error: None,
            attempt: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }
}

impl Default for LifecycleSnapshot {
    fn default() -> Self {
        Self::closed()
    }
}

/// Callback invoked with every lifecycle snapshot.
pub type LifecycleListener = Box<dyn Fn(&LifecycleSnapshot) + Send + Sync + 'static>;

/// Handle returned by `subscribe`; the listener stays registered while it lives.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Wrap the closure that removes the listener from its registry.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn unsubscribe_runs_cancel_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let sub = Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let c = calls.clone();
            let _sub = Subscription::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lifecycle_state_display() {
        assert_eq!(LifecycleState::Initializing.to_string(), "initializing");
        assert!(LifecycleSnapshot {
            state: LifecycleState::Ready,
            last_error: None,
            attempt: 1,
        }
        .is_ready());
        assert!(!LifecycleSnapshot::closed().is_ready());
    }
}
