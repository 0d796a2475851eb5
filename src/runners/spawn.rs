//! # Unrestricted spawn runner.
//!
//! Spawns one task per work item with no queue and no concurrency bound.
//! Simplest fire-and-forget strategy; prefer [`RestrictedRunner`] or a pool
//! when handlers are expensive and publish bursts are large.
//!
//! [`RestrictedRunner`]: crate::RestrictedRunner

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::queue::WorkItem;
use crate::runners::Runner;

/// Runs each work item on its own spawned task.
#[derive(Default)]
pub struct SpawnRunner {
    disposed: AtomicBool,
}

impl SpawnRunner {
    /// Creates the runner. Must be called within a tokio runtime.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Runner for SpawnRunner {
    async fn submit(&self, items: Vec<WorkItem>) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        for item in items {
            tokio::spawn(item);
        }
    }

    async fn shutdown(&self) {
        // Already-spawned items keep running to completion; there is no
        // queue to abandon.
        self.disposed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn all_items_eventually_run() {
        let runner = SpawnRunner::new();
        let ran = Arc::new(AtomicUsize::new(0));

        let items: Vec<WorkItem> = (0..5)
            .map(|_| {
                let ran = Arc::clone(&ran);
                Box::pin(async move {
                    ran.fetch_add(1, Ordering::SeqCst);
                }) as WorkItem
            })
            .collect();
        runner.submit(items).await;

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while ran.load(Ordering::SeqCst) < 5 && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(ran.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn submissions_after_shutdown_are_dropped() {
        let runner = SpawnRunner::new();
        runner.shutdown().await;

        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        runner
            .submit(vec![Box::pin(async move {
                ran2.fetch_add(1, Ordering::SeqCst);
            })])
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
