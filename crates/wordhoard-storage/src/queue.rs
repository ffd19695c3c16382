// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized operation queue.
//!
//! Every database operation a caller submits is run here, one at a time, in
//! submission order. A single worker task drains the queue; it is spawned on
//! demand and exits when the queue runs dry. Each operation runs under the
//! queue's [`RetryPolicy`].

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, warn};
use wordhoard_config::QueueConfig;
use wordhoard_core::WordhoardError;

use crate::retry::RetryPolicy;

/// A type-erased queued operation.
trait QueuedTask: Send {
    fn label(&self) -> &str;

    /// Run the operation (with retries) and deliver its outcome to the caller.
    fn run(self: Box<Self>, policy: RetryPolicy) -> BoxFuture<'static, ()>;

    /// Deliver `err` to the caller without running.
    fn reject(self: Box<Self>, err: WordhoardError);
}

struct Task<F, T> {
    label: String,
    op: F,
    reply: oneshot::Sender<Result<T, WordhoardError>>,
}

impl<F, Fut, T> QueuedTask for Task<F, T>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, WordhoardError>> + Send + 'static,
    T: Send + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn run(self: Box<Self>, policy: RetryPolicy) -> BoxFuture<'static, ()> {
        let Task { label, op, reply } = *self;
        Box::pin(async move {
            let outcome = policy.run(&label, op).await;
            // The caller may have stopped waiting.
            let _ = reply.send(outcome);
        })
    }

    fn reject(self: Box<Self>, err: WordhoardError) {
        let _ = self.reply.send(Err(err));
    }
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Box<dyn QueuedTask>>,
    worker_running: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    policy: RetryPolicy,
    settle_delay: Duration,
}

/// FIFO runner guaranteeing at most one in-flight database operation.
///
/// Cloning is cheap; clones share the same queue.
#[derive(Clone)]
pub struct OperationQueue {
    inner: Arc<QueueInner>,
}

impl OperationQueue {
    pub fn new(policy: RetryPolicy, settle_delay: Duration) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                policy,
                settle_delay,
            }),
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::new(RetryPolicy::from_config(config), config.settle_delay())
    }

    /// Submit an operation and wait for its outcome.
    ///
    /// `op` is called once per attempt; it is called again only after a
    /// transient lock failure. A panic inside the operation surfaces as
    /// [`WordhoardError::Internal`] and does not stop the queue.
    pub async fn enqueue<F, Fut, T>(&self, label: &str, op: F) -> Result<T, WordhoardError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, WordhoardError>> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        let task = Box::new(Task {
            label: label.to_string(),
            op,
            reply,
        });

        {
            let mut state = self.inner.state.lock().await;
            state.pending.push_back(task);
            if !state.worker_running {
                state.worker_running = true;
                tokio::spawn(drain(self.inner.clone()));
            }
        }

        outcome.await.map_err(|_| {
            WordhoardError::Internal(format!("queued operation `{label}` was dropped before completing"))
        })?
    }

    /// Reject every pending operation with [`WordhoardError::Reset`].
    ///
    /// An operation that is already running is left to finish. Returns the
    /// number of operations rejected.
    pub async fn reset(&self) -> usize {
        let drained: Vec<_> = {
            let mut state = self.inner.state.lock().await;
            state.pending.drain(..).collect()
        };
        let count = drained.len();
        for task in drained {
            debug!(operation = task.label(), "rejecting queued operation");
            task.reject(WordhoardError::Reset);
        }
        if count > 0 {
            warn!(rejected = count, "operation queue reset");
        }
        count
    }

    /// Operations waiting to run, not counting one in progress.
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for OperationQueue {
    fn default() -> Self {
        Self::from_config(&QueueConfig::default())
    }
}

async fn drain(inner: Arc<QueueInner>) {
    loop {
        let task = {
            let mut state = inner.state.lock().await;
            match state.pending.pop_front() {
                Some(task) => task,
                None => {
                    state.worker_running = false;
                    return;
                }
            }
        };

        let label = task.label().to_string();
        // Spawned so a panicking operation cannot take the worker down with it.
        if let Err(e) = tokio::spawn(task.run(inner.policy)).await {
            error!(operation = %label, error = %e, "queued operation aborted");
        }

        if !inner.settle_delay.is_zero() && !inner.state.lock().await.pending.is_empty() {
            tokio::time::sleep(inner.settle_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use wordhoard_config::BackoffKind;

    fn queue() -> OperationQueue {
        OperationQueue::new(
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(10),
                backoff: BackoffKind::Exponential,
            },
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn runs_operations_in_submission_order() {
        let q = queue();
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        // join_all polls in order, so submissions land in order.
        let submissions = (0..10).map(|i| {
            let log = log.clone();
            q.enqueue("push", move || {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(i);
                    Ok(())
                }
            })
        });
        for result in futures::future::join_all(submissions).await {
            result.unwrap();
        }
        assert_eq!(*log.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn never_runs_two_operations_at_once() {
        let q = queue();
        let busy = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let q = q.clone();
            let busy = busy.clone();
            let overlaps = overlaps.clone();
            handles.push(tokio::spawn(async move {
                q.enqueue("slow", move || {
                    let busy = busy.clone();
                    let overlaps = overlaps.clone();
                    async move {
                        if busy.swap(true, Ordering::SeqCst) {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        busy.store(false, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reset_rejects_pending_but_not_running() {
        let q = queue();
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let release_rx = Arc::new(Mutex::new(Some(release_rx)));

        let running = {
            let q = q.clone();
            tokio::spawn(async move {
                q.enqueue("blocker", move || {
                    let release_rx = release_rx.clone();
                    async move {
                        if let Some(rx) = release_rx.lock().await.take() {
                            let _ = rx.await;
                        }
                        Ok("finished")
                    }
                })
                .await
            })
        };
        // Let the blocker start.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(q.is_empty().await);

        let pending = {
            let q = q.clone();
            tokio::spawn(async move { q.enqueue("victim", || async { Ok(1) }).await })
        };
        while q.len().await == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(q.reset().await, 1);
        release_tx.send(()).unwrap();

        assert_eq!(running.await.unwrap().unwrap(), "finished");
        assert!(matches!(pending.await.unwrap(), Err(WordhoardError::Reset)));

        // The queue keeps working after a reset.
        assert_eq!(q.enqueue("after", || async { Ok(2) }).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_by_the_queue() {
        let q = queue();
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let value = q
            .enqueue("flaky", move || {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(WordhoardError::LockContention {
                            message: "busy".into(),
                        })
                    } else {
                        Ok(42)
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn panicking_operation_does_not_wedge_queue() {
        let q = queue();
        let result: Result<(), _> = q
            .enqueue("boom", || async { panic!("operation exploded") })
            .await;
        assert!(matches!(result, Err(WordhoardError::Internal(_))));
        assert_eq!(q.enqueue("next", || async { Ok(5) }).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn reset_on_idle_queue_is_noop() {
        let q = queue();
        assert_eq!(q.reset().await, 0);
        assert!(q.is_empty().await);
    }
}
