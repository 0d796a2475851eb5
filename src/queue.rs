//! # Shared FIFO of pending handler invocations.
//!
//! Provides [`WorkQueue`] — an unbounded, thread-safe queue of [`WorkItem`]s
//! drained concurrently by runner workers.
//!
//! ## Rules
//! - **FIFO dequeue**: items leave in submission order (execution order across
//!   multiple workers is still unordered).
//! - **Timed take**: [`WorkQueue::take`] waits at most the given duration, so
//!   workers can observe shutdown without a dedicated wake signal.
//! - **Depth sampling**: [`WorkQueue::len`] is a point-in-time sample used by
//!   the adaptive pool's control loop.
//!
//! Dropping the queue drops all still-pending items without polling them,
//! which is how abandoned work stays abandoned after shutdown.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::Notify;
use tokio::time::{self, Instant};

/// One queued handler invocation: a zero-argument unit of work built at
/// publish time. Running the future performs the filter check, the handler
/// call, and the error isolation — a worker only awaits it.
pub type WorkItem = BoxFuture<'static, ()>;

/// Unbounded multi-consumer FIFO of [`WorkItem`]s.
#[derive(Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    notify: Notify,
}

impl WorkQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a batch of items and wakes waiting takers.
    ///
    /// Never blocks and never fails; the queue is unbounded.
    pub fn push_batch(&self, batch: Vec<WorkItem>) {
        let added = batch.len();
        self.lock().extend(batch);
        for _ in 0..added {
            self.notify.notify_one();
        }
    }

    /// Returns the current number of queued (not yet dequeued) items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no items are queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Dequeues the next item, waiting up to `wait` for one to arrive.
    ///
    /// Returns `None` on timeout. Multiple workers may call this
    /// concurrently; each item is handed to exactly one taker.
    pub async fn take(&self, wait: Duration) -> Option<WorkItem> {
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register as a waiter before the dequeue attempt so a push
            // landing in between cannot be missed.
            notified.as_mut().enable();

            if let Some(item) = self.pop() {
                return Some(item);
            }
            if time::timeout_at(deadline, notified).await.is_err() {
                return self.pop();
            }
        }
    }

    fn pop(&self) -> Option<WorkItem> {
        let mut items = self.lock();
        let item = items.pop_front();
        let more = !items.is_empty();
        drop(items);
        // Permits do not accumulate past one, so chain a wake-up for the
        // next waiter while items remain.
        if item.is_some() && more {
            self.notify.notify_one();
        }
        item
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        // Work items catch their own panics, so the lock cannot be poisoned
        // by handler code; recover rather than unwrap.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_item(counter: &Arc<AtomicUsize>) -> WorkItem {
        let counter = Arc::clone(counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn take_returns_pushed_item() {
        let queue = WorkQueue::new();
        let ran = Arc::new(AtomicUsize::new(0));
        queue.push_batch(vec![counting_item(&ran)]);

        let item = queue.take(Duration::from_millis(50)).await;
        item.expect("item should be available").await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn take_times_out_on_empty_queue() {
        let queue = WorkQueue::new();
        let started = std::time::Instant::now();
        assert!(queue.take(Duration::from_millis(30)).await.is_none());
        assert!(started.elapsed() >= Duration::from_millis(25));
    }

    #[tokio::test]
    async fn items_leave_in_fifo_order() {
        let queue = WorkQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let batch: Vec<WorkItem> = (0..4)
            .map(|n| {
                let order = Arc::clone(&order);
                Box::pin(async move {
                    order.lock().unwrap().push(n);
                }) as WorkItem
            })
            .collect();
        queue.push_batch(batch);
        assert_eq!(queue.len(), 4);

        while let Some(item) = queue.take(Duration::from_millis(10)).await {
            item.await;
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn waiting_taker_is_woken_by_push() {
        let queue = Arc::new(WorkQueue::new());
        let ran = Arc::new(AtomicUsize::new(0));

        let taker = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.take(Duration::from_secs(2)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push_batch(vec![counting_item(&ran)]);

        let item = taker.await.expect("taker task").expect("woken with item");
        item.await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
