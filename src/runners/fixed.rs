//! # Fixed-size worker pool runner.
//!
//! Provides [`FixedPoolRunner`] — N workers started at construction, all
//! draining one shared [`WorkQueue`]. The workhorse strategy when the load is
//! known and stable; the adaptive pool exists for when it is not.
//!
//! ## Shutdown path
//! ```text
//! shutdown()
//!   ├─► cancel token            → workers exit after their current item
//!   ├─► join each worker        (bounded by the grace period)
//!   └─► queued-but-unstarted items are dropped with the queue, never run
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::queue::{WorkItem, WorkQueue};
use crate::runners::Runner;

/// How long a worker blocks on the queue before re-checking shutdown.
const TAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs work items on a fixed number of pool workers.
pub struct FixedPoolRunner {
    queue: Arc<WorkQueue>,
    token: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    grace: Duration,
    disposed: AtomicBool,
}

impl FixedPoolRunner {
    /// Starts `worker_count` workers immediately.
    ///
    /// Must be called within a tokio runtime. Fails with
    /// [`ConfigError::NonPositive`] when `worker_count` is zero.
    pub fn new(worker_count: usize) -> Result<Self, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::NonPositive {
                name: "worker_count",
                value: worker_count,
            });
        }

        let queue = Arc::new(WorkQueue::new());
        let token = CancellationToken::new();
        let workers = (0..worker_count)
            .map(|_| tokio::spawn(worker_loop(Arc::clone(&queue), token.clone())))
            .collect();

        Ok(Self {
            queue,
            token,
            workers: Mutex::new(workers),
            grace: TAKE_TIMEOUT,
            disposed: AtomicBool::new(false),
        })
    }

    /// Current number of queued (not yet started) items.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }
}

async fn worker_loop(queue: Arc<WorkQueue>, token: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            item = queue.take(TAKE_TIMEOUT) => {
                let Some(item) = item else { continue };
                // Re-checked after the dequeue: an item handed out while
                // shutdown is underway has not started and stays abandoned.
                if token.is_cancelled() {
                    break;
                }
                item.await;
            }
        }
    }
}

#[async_trait]
impl Runner for FixedPoolRunner {
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

        let workers: Vec<JoinHandle<()>> = {
            let mut guard = self
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.drain(..).collect()
        };
        for worker in workers {
            if time::timeout(self.grace, worker).await.is_err() {
                // In-flight item outlived the grace period; it is left to
                // finish detached rather than being interrupted.
                log::debug!("fixed pool worker still busy after grace period");
            }
        }
    }
}
