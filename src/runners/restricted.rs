//! # Concurrency-restricted runner.
//!
//! Provides [`RestrictedRunner`] — an unbounded queue feeding ephemeral
//! tasks, with a hard cap on how many work items execute simultaneously.
//!
//! ## Design
//! A single dispatcher task dequeues items and admits each through a counting
//! gate. At capacity it polls the gate with a short backoff instead of
//! blocking indefinitely, re-checking shutdown on every poll so `shutdown`
//! stays responsive. Completions decrement the gate from the item's own task.
//! Admission uses a compare-and-swap update, so admission and completion can
//! never race past the cap.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::queue::{WorkItem, WorkQueue};
use crate::runners::Runner;

/// How long the dispatcher blocks on the queue before re-checking shutdown.
const TAKE_TIMEOUT: Duration = Duration::from_secs(1);
/// Backoff between gate polls while at capacity.
const GATE_BACKOFF: Duration = Duration::from_millis(50);

/// Runs work items on ephemeral tasks, at most `max_concurrent` at a time.
pub struct RestrictedRunner {
    queue: Arc<WorkQueue>,
    token: CancellationToken,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    in_flight: Arc<AtomicUsize>,
    disposed: AtomicBool,
}

impl RestrictedRunner {
    /// Starts the dispatcher with the given concurrency cap.
    ///
    /// Must be called within a tokio runtime. Fails with
    /// [`ConfigError::NonPositive`] when `max_concurrent` is zero.
    pub fn new(max_concurrent: usize) -> Result<Self, ConfigError> {
        if max_concurrent == 0 {
            return Err(ConfigError::NonPositive {
                name: "max_concurrent",
                value: max_concurrent,
            });
        }

        let queue = Arc::new(WorkQueue::new());
        let token = CancellationToken::new();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let dispatcher = tokio::spawn(dispatcher_loop(
            Arc::clone(&queue),
            token.clone(),
            Arc::clone(&in_flight),
            max_concurrent,
        ));

        Ok(Self {
            queue,
            token,
            dispatcher: Mutex::new(Some(dispatcher)),
            in_flight,
            disposed: AtomicBool::new(false),
        })
    }

    /// Number of work items currently executing.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Current number of queued (not yet admitted) items.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }
}

async fn dispatcher_loop(
    queue: Arc<WorkQueue>,
    token: CancellationToken,
    in_flight: Arc<AtomicUsize>,
    cap: usize,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            item = queue.take(TAKE_TIMEOUT) => {
                let Some(item) = item else { continue };
                let mut item = Some(item);
                loop {
                    if token.is_cancelled() {
                        // Dequeued but never admitted: the item is abandoned,
                        // satisfying the "unstarted work never runs" contract.
                        return;
                    }
                    if try_admit(&in_flight, cap) {
                        if let Some(admitted) = item.take() {
                            let gate = Arc::clone(&in_flight);
                            tokio::spawn(async move {
                                admitted.await;
                                gate.fetch_sub(1, Ordering::AcqRel);
                            });
                        }
                        break;
                    }
                    time::sleep(GATE_BACKOFF).await;
                }
            }
        }
    }
}

/// Claims a slot if one is free; never admits past the cap.
fn try_admit(gate: &AtomicUsize, cap: usize) -> bool {
    gate.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
        (current < cap).then_some(current + 1)
    })
    .is_ok()
}

#[async_trait]
impl Runner for RestrictedRunner {
    async fn submit(&self, items: Vec<WorkItem>) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        self.queue.push_batch(items);
    }

    async fn shutdown(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.token.cancel();

        let dispatcher = {
            let mut guard = self
                .dispatcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.take()
        };
        if let Some(dispatcher) = dispatcher {
            if time::timeout(TAKE_TIMEOUT + GATE_BACKOFF, dispatcher)
                .await
                .is_err()
            {
                log::debug!("restricted runner dispatcher still busy after grace period");
            }
        }

        // Give in-flight items a bounded window to drain; they are never
        // interrupted if they overrun it.
        let deadline = time::Instant::now() + TAKE_TIMEOUT;
        while self.in_flight.load(Ordering::Acquire) > 0 && time::Instant::now() < deadline {
            time::sleep(Duration::from_millis(10)).await;
        }
    }
}
