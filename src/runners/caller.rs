//! # Synchronous, caller-task runner.
//!
//! Runs every submitted work item inline, in submission order, on the task
//! that called `submit`. The one runner whose submit completes only after all
//! items have finished — useful in tests and in code that wants publish to
//! behave like a plain function call.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::queue::WorkItem;
use crate::runners::Runner;

/// Runs work items on the publishing task, blocking it until all are done.
#[derive(Default)]
pub struct CallerRunner {
    disposed: AtomicBool,
}

impl CallerRunner {
    /// Creates the runner. Holds no threads or queues.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Runner for CallerRunner {
    async fn submit(&self, items: Vec<WorkItem>) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        for item in items {
            item.await;
        }
    }

    async fn shutdown(&self) {
        self.disposed.store(true, Ordering::Release);
    }
}
