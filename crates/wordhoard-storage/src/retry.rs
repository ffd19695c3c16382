// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retry of operations that hit SQLite lock contention.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use wordhoard_config::{BackoffKind, QueueConfig};
use wordhoard_core::WordhoardError;

/// How often, and how patiently, a locked operation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: BackoffKind,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&QueueConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay(),
            backoff: config.backoff,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            backoff: BackoffKind::Linear,
        }
    }

    /// Delay before retry number `attempt` (1-based: the wait after the first failure is `delay_for(1)`).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            BackoffKind::Linear => self.base_delay.saturating_mul(attempt),
            BackoffKind::Exponential => {
                let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor)
            }
        }
    }

    /// Run `op`, retrying only while it fails with transient lock contention.
    ///
    /// Any other error is returned untouched on the attempt that produced it.
    /// Contention that outlasts every attempt becomes [`WordhoardError::LockTimeout`].
    pub async fn run<F, Fut, T>(&self, label: &str, mut op: F) -> Result<T, WordhoardError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WordhoardError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts,
                        ?delay,
                        "database locked, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    return Err(WordhoardError::LockTimeout {
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn locked() -> WordhoardError {
        WordhoardError::LockContention {
            message: "database is locked".into(),
        }
    }

    fn policy(max_attempts: u32, backoff: BackoffKind) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            backoff,
        }
    }

    #[test]
    fn exponential_delays_double() {
        let p = policy(3, BackoffKind::Exponential);
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(2), Duration::from_millis(200));
        assert_eq!(p.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn linear_delays_grow_by_base() {
        let p = policy(3, BackoffKind::Linear);
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(2), Duration::from_millis(200));
        assert_eq!(p.delay_for(3), Duration::from_millis(300));
    }

    #[test]
    fn huge_attempt_saturates() {
        let p = policy(3, BackoffKind::Exponential);
        assert!(p.delay_for(200) >= p.delay_for(20));
    }

    #[tokio::test(start_paused = true)]
    async fn contention_then_success_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = policy(3, BackoffKind::Exponential)
            .run("test", move || {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(locked())
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_contention_becomes_lock_timeout() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<(), _> = policy(3, BackoffKind::Linear)
            .run("test", move || {
                c.fetch_add(1, Ordering::SeqCst);
                async { Err(locked()) }
            })
            .await;
        assert!(matches!(
            result,
            Err(WordhoardError::LockTimeout { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<(), _> = policy(3, BackoffKind::Exponential)
            .run("test", move || {
                c.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(WordhoardError::NotFound {
                        entity: "word",
                        id: 9,
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(WordhoardError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_between_attempts() {
        let start = tokio::time::Instant::now();
        let _: Result<(), _> = policy(3, BackoffKind::Exponential)
            .run("test", || async { Err(locked()) })
            .await;
        // 100ms after the first failure, 200ms after the second.
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn each_retry_is_logged() {
        let _: Result<(), _> = policy(2, BackoffKind::Linear)
            .run("answer", || async { Err(locked()) })
            .await;
        assert!(logs_contain("database locked, retrying"));
        assert!(logs_contain("attempt=1"));
    }

    #[tokio::test]
    async fn no_retry_policy_converts_first_contention() {
        let result: Result<(), _> = RetryPolicy::no_retry()
            .run("test", || async { Err(locked()) })
            .await;
        assert!(matches!(
            result,
            Err(WordhoardError::LockTimeout { attempts: 1, .. })
        ));
    }
}
