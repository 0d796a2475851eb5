//! # eventcast
//!
//! **Eventcast** is a lightweight in-process publish/subscribe library for
//! Rust.
//!
//! Events are plain values routed by their concrete type. Handlers subscribe
//! per event type and are invoked through a pluggable execution strategy,
//! from inline on the publisher to an adaptive worker pool. The crate is
//! designed as a building block for decoupling components inside one process,
//! not as a message broker between processes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌────────────┐  ┌────────────┐  ┌────────────────────┐
//!  │ Handle<E>  │  │ FnHandler  │  │  HandlerProvider   │
//!  │ (trait obj)│  │ (closures) │  │ (ad-hoc, per call) │
//!  └─────┬──────┘  └─────┬──────┘  └─────────┬──────────┘
//!        │ subscribe     │ subscribe_fn      │ handlers_for(key)
//!        ▼               ▼                   │
//! ┌───────────────────────────────────┐      │
//! │  SubscriptionRegistry             │      │
//! │  - type key → subscriptions       │      │
//! │  - tokens, active flags           │      │
//! └───────────────┬───────────────────┘      │
//!                 │ snapshot                 │
//!                 ▼                          ▼
//! ┌───────────────────────────────────────────────────┐
//! │  Broker::publish(event)                           │
//! │  - one work item per handler                      │
//! │  - filter check, error isolation baked in         │
//! └───────────────────────┬───────────────────────────┘
//!                         │ submit(batch)
//!                         ▼
//! ┌───────────────────────────────────────────────────┐
//! │  Runner (strategy)                                │
//! │  Caller │ Spawn │ FixedPool │ AdaptivePool │      │
//! │  Restricted                                       │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ### Invocation
//! ```text
//! work item {
//!   ├─► still subscribed?      ─ no ─► skip
//!   ├─► should_handle(event)?  ─ no ─► skip
//!   ├─► handle(event)
//!   │     ├─ Ok    ─► done
//!   │     ├─ Err   ─► on_error(error, event)
//!   │     └─ panic ─► caught, routed to on_error as well
//!   └─► on_error panics are caught and dropped; nothing escapes
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                             |
//! |-------------------|---------------------------------------------------------------|------------------------------------------------|
//! | **Broker**        | Subscribe, publish, unsubscribe, shutdown.                    | [`Broker`], [`SubscriptionToken`]              |
//! | **Handlers**      | Typed handlers with optional filter and error callback.       | [`Handle`], [`FnHandler`], [`HandlerProvider`] |
//! | **Runners**       | Pluggable execution strategies.                               | [`Runner`], [`AdaptivePoolRunner`], ...        |
//! | **Queue**         | Shared FIFO feeding pool workers.                             | [`WorkQueue`], [`WorkItem`]                    |
//! | **Errors**        | Typed errors for configuration and handler outcomes.          | [`ConfigError`], [`HandlerError`]              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventcast::{Broker, FixedPoolRunner, FnHandler, HandlerError};
//!
//! #[derive(Debug)]
//! struct OrderPlaced {
//!     id: u64,
//! }
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = Broker::new(Arc::new(FixedPoolRunner::new(2)?));
//!
//!     // Plain closure subscriber.
//!     broker.subscribe_fn(|order: &OrderPlaced| {
//!         println!("placed: {}", order.id);
//!     });
//!
//!     // Fallible handler with a filter and an error callback.
//!     let audit = FnHandler::fallible(|order: &OrderPlaced| {
//!         if order.id == 0 {
//!             return Err(HandlerError::fail("order id must be non-zero"));
//!         }
//!         Ok(())
//!     })
//!     .with_filter(|order| order.id % 2 == 0)
//!     .with_on_error(|error, order| eprintln!("audit failed for {}: {error}", order.id));
//!     broker.subscribe(Arc::new(audit));
//!
//!     broker.publish(OrderPlaced { id: 42 }).await;
//!     broker.shutdown().await;
//!     Ok(())
//! }
//! ```

mod broker;
mod error;
mod event;
mod handlers;
mod queue;
mod registry;
mod runners;

// ---- Public re-exports ----

pub use broker::Broker;
pub use error::{ConfigError, HandlerError};
pub use event::{Event, EventTypeKey};
pub use handlers::{FnHandler, Handle, HandlerProvider, ProvidedHandler};
pub use queue::{WorkItem, WorkQueue};
pub use registry::SubscriptionToken;
pub use runners::{
    AdaptiveConfig, AdaptivePoolRunner, CallerRunner, FixedPoolRunner, RestrictedRunner, Runner,
    SpawnRunner,
};
