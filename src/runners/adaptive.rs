//! # Adaptive worker pool runner.
//!
//! Provides [`AdaptivePoolRunner`] — a pool that grows and shrinks its worker
//! count between 1 and [`AdaptiveConfig::max_workers`] based on sampled queue
//! depth.
//!
//! ## Control loop (own task, period = `check_interval`)
//! ```text
//! tick:
//!   depth = queue.len()
//!   depth > threshold ──► above += 1, below = 0
//!   │                     above > cycles_before_grow ──► above = 0, grow()
//!   └─ otherwise      ──► below += 1, above = 0
//!                         below > cycles_before_shrink ──► below = 0, shrink()
//! ```
//!
//! ## Rules
//! - `grow()` is a no-op at `max_workers`; excess requests are silently
//!   dropped.
//! - `shrink()` never goes below one worker (liveness floor) and retires the
//!   most recently started worker.
//! - Retirement never interrupts in-flight work: the retired worker finishes
//!   (or times out waiting for) its current dequeue, then exits — at most one
//!   take-timeout of latency.
//! - Cycle counters are discrete check ticks, not wall-clock time, so
//!   `check_interval` governs both responsiveness and control-loop overhead.
//!   That trade-off is deliberate; the heuristic can oscillate under bursty
//!   load and no smoothing is applied.
//!
//! The worker-handle collection is owned exclusively by the control loop;
//! workers only observe their own retirement token.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::queue::{WorkItem, WorkQueue};
use crate::runners::Runner;

/// How long a worker blocks on the queue before re-checking its flags.
const TAKE_TIMEOUT: Duration = Duration::from_millis(100);

/// Scaling parameters for [`AdaptivePoolRunner`].
///
/// All fields are validated at runner construction; every out-of-range value
/// is a [`ConfigError`].
#[derive(Clone, Debug)]
pub struct AdaptiveConfig {
    /// Control-loop sampling period. Must be positive.
    pub check_interval: Duration,
    /// Queue depth above which a tick counts toward growing. Must be positive.
    pub queue_depth_threshold: usize,
    /// Consecutive above-threshold ticks required before adding a worker.
    pub cycles_before_grow: u32,
    /// Consecutive below-threshold ticks required before retiring a worker.
    pub cycles_before_shrink: u32,
    /// Upper bound on concurrent workers. Must be positive.
    pub max_workers: usize,
}

impl Default for AdaptiveConfig {
    /// Defaults: 100 ms interval, threshold 2, grow after 2 cycles, shrink
    /// after 20, at most 5 workers.
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(100),
            queue_depth_threshold: 2,
            cycles_before_grow: 2,
            cycles_before_shrink: 20,
            max_workers: 5,
        }
    }
}

impl AdaptiveConfig {
    /// Checks every field, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval.is_zero() {
            return Err(ConfigError::ZeroInterval {
                name: "check_interval",
                value: self.check_interval,
            });
        }
        for (name, value) in [
            ("queue_depth_threshold", self.queue_depth_threshold),
            ("cycles_before_grow", self.cycles_before_grow as usize),
            ("cycles_before_shrink", self.cycles_before_shrink as usize),
            ("max_workers", self.max_workers),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// Handle the control loop keeps per active worker.
struct Worker {
    retire: CancellationToken,
    join: JoinHandle<()>,
}

/// State owned by the control-loop task.
struct ControlLoop {
    queue: Arc<WorkQueue>,
    token: CancellationToken,
    config: AdaptiveConfig,
    worker_count: Arc<AtomicUsize>,
    workers: Vec<Worker>,
    retired: Vec<JoinHandle<()>>,
}

impl ControlLoop {
    async fn run(mut self) {
        self.grow();

        let mut interval = time::interval(self.config.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut above: u32 = 0;
        let mut below: u32 = 0;

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = interval.tick() => {
                    let depth = self.queue.len();
                    if depth > self.config.queue_depth_threshold {
                        above += 1;
                        below = 0;
                        if above > self.config.cycles_before_grow {
                            above = 0;
                            self.grow();
                        }
                    } else {
                        below += 1;
                        above = 0;
                        if below > self.config.cycles_before_shrink {
                            below = 0;
                            self.shrink();
                        }
                    }
                }
            }
        }

        self.join_all().await;
    }

    fn grow(&mut self) {
        if self.workers.len() >= self.config.max_workers {
            return;
        }
        let retire = CancellationToken::new();
        let join = tokio::spawn(worker_loop(
            Arc::clone(&self.queue),
            self.token.clone(),
            retire.clone(),
        ));
        self.workers.push(Worker { retire, join });
        self.worker_count.store(self.workers.len(), Ordering::Release);
        log::debug!("adaptive pool grew to {} worker(s)", self.workers.len());
    }

    fn shrink(&mut self) {
        if self.workers.len() <= 1 {
            return;
        }
        if let Some(worker) = self.workers.pop() {
            worker.retire.cancel();
            self.retired.push(worker.join);
            self.worker_count.store(self.workers.len(), Ordering::Release);
            log::debug!("adaptive pool shrank to {} worker(s)", self.workers.len());
        }
    }

    async fn join_all(&mut self) {
        for worker in self.workers.drain(..) {
            worker.retire.cancel();
            self.retired.push(worker.join);
        }
        let grace = TAKE_TIMEOUT.max(self.config.check_interval);
        for join in self.retired.drain(..) {
            if time::timeout(grace, join).await.is_err() {
                log::debug!("adaptive pool worker still busy after grace period");
            }
        }
    }
}

async fn worker_loop(queue: Arc<WorkQueue>, pool: CancellationToken, retire: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = pool.cancelled() => break,
            _ = retire.cancelled() => break,
            item = queue.take(TAKE_TIMEOUT) => {
                let Some(item) = item else { continue };
                // Pool shutdown abandons a dequeued-but-unstarted item.
                // Retirement does not: the item already left the shared queue
                // and runs here, so retirement never loses work.
                if pool.is_cancelled() {
                    break;
                }
                item.await;
            }
        }
    }
}

/// Runner that right-sizes its worker set from observed queue pressure.
pub struct AdaptivePoolRunner {
    queue: Arc<WorkQueue>,
    token: CancellationToken,
    control: Mutex<Option<JoinHandle<()>>>,
    worker_count: Arc<AtomicUsize>,
    disposed: AtomicBool,
}

impl AdaptivePoolRunner {
    /// Validates `config`, starts one worker and the control loop.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(config: AdaptiveConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let queue = Arc::new(WorkQueue::new());
        let token = CancellationToken::new();
        let worker_count = Arc::new(AtomicUsize::new(0));

        let control = tokio::spawn(
            ControlLoop {
                queue: Arc::clone(&queue),
                token: token.clone(),
                config,
                worker_count: Arc::clone(&worker_count),
                workers: Vec::new(),
                retired: Vec::new(),
            }
            .run(),
        );

        Ok(Self {
            queue,
            token,
            control: Mutex::new(Some(control)),
            worker_count,
            disposed: AtomicBool::new(false),
        })
    }

    /// Current number of active (non-retired) workers.
    pub fn worker_count(&self) -> usize {
        self.worker_count.load(Ordering::Acquire)
    }

    /// Current number of queued (not yet started) items.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl Runner for AdaptivePoolRunner {
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

        let control = {
            let mut guard = self
                .control
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.take()
        };
        if let Some(control) = control {
            // The control loop joins each worker with a bounded grace
            // period, so this await is bounded too.
            let _ = control.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn fast_config() -> AdaptiveConfig {
        AdaptiveConfig {
            check_interval: Duration::from_millis(20),
            queue_depth_threshold: 2,
            cycles_before_grow: 2,
            cycles_before_shrink: 2,
            max_workers: 2,
        }
    }

    fn sleeping_item(done: &Arc<AtomicUsize>, dur: Duration) -> WorkItem {
        let done = Arc::clone(done);
        Box::pin(async move {
            tokio::time::sleep(dur).await;
            done.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
        let end = std::time::Instant::now() + deadline;
        while std::time::Instant::now() < end {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        condition()
    }

    #[test]
    fn each_field_is_validated() {
        let ok = AdaptiveConfig::default();
        assert!(ok.validate().is_ok());

        let cases: Vec<(AdaptiveConfig, &str)> = vec![
            (
                AdaptiveConfig {
                    check_interval: Duration::ZERO,
                    ..ok.clone()
                },
                "check_interval",
            ),
            (
                AdaptiveConfig {
                    queue_depth_threshold: 0,
                    ..ok.clone()
                },
                "queue_depth_threshold",
            ),
            (
                AdaptiveConfig {
                    cycles_before_grow: 0,
                    ..ok.clone()
                },
                "cycles_before_grow",
            ),
            (
                AdaptiveConfig {
                    cycles_before_shrink: 0,
                    ..ok.clone()
                },
                "cycles_before_shrink",
            ),
            (
                AdaptiveConfig {
                    max_workers: 0,
                    ..ok.clone()
                },
                "max_workers",
            ),
        ];
        for (config, field) in cases {
            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains(field),
                "expected error naming {field}, got: {err}"
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn starts_with_exactly_one_worker() {
        let runner = AdaptivePoolRunner::new(fast_config()).unwrap();
        assert!(wait_until(Duration::from_secs(1), || runner.worker_count() == 1).await);
        runner.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sustained_pressure_grows_to_max_and_not_beyond() {
        let runner = AdaptivePoolRunner::new(fast_config()).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        // Far more slow items than one worker can drain: depth stays above
        // the threshold across many check ticks.
        runner
            .submit(
                (0..40)
                    .map(|_| sleeping_item(&done, Duration::from_millis(50)))
                    .collect(),
            )
            .await;

        assert!(
            wait_until(Duration::from_secs(3), || runner.worker_count() == 2).await,
            "pool should grow to max_workers under sustained load"
        );

        // Keep the pressure up; the cap must hold.
        runner
            .submit(
                (0..20)
                    .map(|_| sleeping_item(&done, Duration::from_millis(50)))
                    .collect(),
            )
            .await;
        for _ in 0..10 {
            assert!(runner.worker_count() <= 2);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        runner.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn idle_pool_shrinks_back_to_one_worker() {
        let runner = AdaptivePoolRunner::new(fast_config()).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        runner
            .submit(
                (0..40)
                    .map(|_| sleeping_item(&done, Duration::from_millis(30)))
                    .collect(),
            )
            .await;
        assert!(wait_until(Duration::from_secs(3), || runner.worker_count() == 2).await);

        // Stop publishing and let the queue drain.
        assert!(
            wait_until(Duration::from_secs(5), || done.load(Ordering::SeqCst) == 40).await
        );
        assert!(
            wait_until(Duration::from_secs(3), || runner.worker_count() == 1).await,
            "pool should shrink toward the liveness floor when idle"
        );

        // And never below one.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runner.worker_count(), 1);

        runner.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn queued_items_never_run_once_shutdown_returns() {
        // Scaling disabled (huge cycle counts) so the single worker is the
        // only consumer in every trial.
        let config = AdaptiveConfig {
            check_interval: Duration::from_millis(20),
            queue_depth_threshold: 2,
            cycles_before_grow: 1_000,
            cycles_before_shrink: 1_000,
            max_workers: 2,
        };

        for trial in 0..10 {
            let runner = AdaptivePoolRunner::new(config.clone()).unwrap();
            assert!(wait_until(Duration::from_secs(1), || runner.worker_count() == 1).await);

            let gate = Arc::new(Notify::new());
            let started = Arc::new(AtomicUsize::new(0));
            let blocker: WorkItem = {
                let gate = Arc::clone(&gate);
                let started = Arc::clone(&started);
                Box::pin(async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                })
            };
            runner.submit(vec![blocker]).await;
            assert!(wait_until(Duration::from_secs(1), || started
                .load(Ordering::SeqCst)
                == 1)
                .await);

            let ran = Arc::new(AtomicUsize::new(0));
            runner
                .submit(
                    (0..3)
                        .map(|_| {
                            let ran = Arc::clone(&ran);
                            Box::pin(async move {
                                ran.fetch_add(1, Ordering::SeqCst);
                            }) as WorkItem
                        })
                        .collect(),
                )
                .await;

            // Release the parked worker mid-shutdown; it wakes with the
            // queue still non-empty.
            let release = {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    gate.notify_one();
                })
            };
            runner.shutdown().await;
            let _ = release.await;

            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(
                ran.load(Ordering::SeqCst),
                0,
                "abandoned item ran in trial {trial}"
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn shutdown_is_idempotent_and_drops_late_submissions() {
        let runner = AdaptivePoolRunner::new(fast_config()).unwrap();
        runner.shutdown().await;
        runner.shutdown().await;

        let done = Arc::new(AtomicUsize::new(0));
        runner
            .submit(vec![sleeping_item(&done, Duration::from_millis(1))])
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(done.load(Ordering::SeqCst), 0);
    }
}
