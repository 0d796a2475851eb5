//! Execution strategies ("runners") for submitted work items.
//!
//! A [`Runner`] decides how and where handler invocations run. The broker
//! builds one batch of [`WorkItem`](crate::WorkItem)s per publish and hands
//! it over; everything after that — queuing, scheduling, worker lifecycle —
//! is the runner's business.
//!
//! ## Strategies
//! | Runner                 | Scheduling                                          |
//! |------------------------|-----------------------------------------------------|
//! | [`CallerRunner`]       | inline on the publishing task (blocking)            |
//! | [`SpawnRunner`]        | one spawned task per item, no bound                 |
//! | [`FixedPoolRunner`]    | N workers over a shared queue                       |
//! | [`AdaptivePoolRunner`] | 1..=max workers, scaled from sampled queue depth    |
//! | [`RestrictedRunner`]   | unbounded queue, at most N items executing at once  |
//!
//! ## Contracts
//! - Queue-backed submits complete without waiting for item completion
//!   ([`CallerRunner`] is the documented exception).
//! - Work items isolate their own failures; a runner worker only awaits them.
//! - `shutdown` is idempotent: after it returns no further work is accepted,
//!   queued-but-unstarted items are abandoned once the grace period elapses,
//!   and in-flight items are never preempted.

mod adaptive;
mod caller;
mod fixed;
mod restricted;
mod spawn;

use async_trait::async_trait;

use crate::queue::WorkItem;

pub use adaptive::{AdaptiveConfig, AdaptivePoolRunner};
pub use caller::CallerRunner;
pub use fixed::FixedPoolRunner;
pub use restricted::RestrictedRunner;
pub use spawn::SpawnRunner;

/// Pluggable execution strategy turning submitted work items into actual
/// invocations.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Accepts a batch of work items for execution.
    ///
    /// Submissions after [`Runner::shutdown`] are silently dropped.
    async fn submit(&self, items: Vec<WorkItem>);

    /// Stops the runner: no further work is accepted, queued items are
    /// abandoned after a bounded grace period, in-flight items finish
    /// undisturbed. Safe to call more than once.
    async fn shutdown(&self);
}
