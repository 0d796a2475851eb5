//! # Event broker: subscriptions, publishing, and composition.
//!
//! [`Broker`] wires the subscription registry, a [`Runner`], and an optional
//! [`HandlerProvider`] into the publish/subscribe surface.
//!
//! ## Publish flow
//! ```text
//! publish(event)
//!   ├─► registry.snapshot(type key)
//!   │     └─► one work item per subscription:
//!   │           active?  ── re-checked at execution time, not enqueue time
//!   │           should_handle? → handle → on_error on failure (isolated)
//!   ├─► provider.handlers_for(type key)     (optional, no active re-check)
//!   └─► runner.submit(all items, one batch)
//! ```
//!
//! ## Rules
//! - No ordering guarantee between handlers of one event, nor across
//!   publishes of the same type: work items interleave in the runner's queue.
//! - Unsubscribe tombstones the subscription; a work item already queued
//!   observes the flag when it runs and skips itself. An item concurrently
//!   being dequeued has no defined winner — running or skipping are both
//!   acceptable outcomes.
//! - Handler failures never surface to `publish`; only runner construction
//!   validates anything.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use eventcast::{Broker, CallerRunner};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let broker = Broker::new(Arc::new(CallerRunner::new()));
//!
//! let token = broker.subscribe_fn(|greeting: &String| {
//!     println!("got: {greeting}");
//! });
//! broker.publish("hello".to_string()).await;
//!
//! broker.unsubscribe(token);
//! broker.shutdown().await;
//! # }
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::event::{Event, EventTypeKey};
use crate::handlers::{FnHandler, Handle, HandlerProvider, TypedHandler};
use crate::queue::WorkItem;
use crate::registry::{SubscriptionRegistry, SubscriptionToken};
use crate::runners::Runner;

/// In-process publish/subscribe dispatcher.
///
/// Each broker owns its registry; there is no process-wide state. Cheap to
/// share behind an `Arc`.
pub struct Broker {
    registry: SubscriptionRegistry,
    runner: Arc<dyn Runner>,
    provider: Option<Arc<dyn HandlerProvider>>,
}

impl Broker {
    /// Creates a broker dispatching through `runner`.
    pub fn new(runner: Arc<dyn Runner>) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            runner,
            provider: None,
        }
    }

    /// Creates a broker that additionally queries `provider` for ad-hoc
    /// handlers on every publish.
    pub fn with_provider(runner: Arc<dyn Runner>, provider: Arc<dyn HandlerProvider>) -> Self {
        Self {
            provider: Some(provider),
            ..Self::new(runner)
        }
    }

    /// Subscribes a handler object for events of type `E`.
    ///
    /// The returned token is the reliable removal handle; keep it if you plan
    /// to unsubscribe.
    pub fn subscribe<E: Event, H: Handle<E>>(&self, handler: Arc<H>) -> SubscriptionToken {
        let handler_ptr = Arc::as_ptr(&handler) as *const () as usize;
        self.registry.add(
            EventTypeKey::of::<E>(),
            handler_ptr,
            Arc::new(TypedHandler::new(handler)),
        )
    }

    /// Subscribes a plain closure for events of type `E`.
    ///
    /// For a filter or error callback, build a [`FnHandler`] and pass it to
    /// [`Broker::subscribe`].
    pub fn subscribe_fn<E: Event>(
        &self,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> SubscriptionToken {
        self.subscribe(Arc::new(FnHandler::new(handler)))
    }

    /// Removes the subscription identified by `token`.
    ///
    /// Already-queued invocations of it are suppressed when they reach a
    /// worker. Unknown or already-removed tokens are a no-op.
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.registry
            .remove(token.event_key(), |sub| sub.id == token.id());
    }

    /// Removes every subscription registered with exactly this handler
    /// allocation (pointer identity).
    ///
    /// Legacy path: closures passed to [`Broker::subscribe_fn`] get a fresh
    /// allocation per call and cannot be matched this way — use the token.
    pub fn unsubscribe_handler<E: Event, H: Handle<E>>(&self, handler: &Arc<H>) {
        let handler_ptr = Arc::as_ptr(handler) as *const () as usize;
        self.registry
            .remove(EventTypeKey::of::<E>(), move |sub| {
                sub.handler_ptr == handler_ptr
            });
    }

    /// Publishes an event to all current subscribers of its exact type.
    ///
    /// Returns once the batch is handed to the runner; with any queue-backed
    /// runner that is before handlers run. Never fails, whatever handlers do.
    pub async fn publish<E: Event>(&self, event: E) {
        self.publish_arc(Arc::new(event)).await;
    }

    /// Publishes a pre-shared event without cloning it per subscriber.
    ///
    /// Hot-path variant of [`Broker::publish`].
    pub async fn publish_arc<E: Event>(&self, event: Arc<E>) {
        let key = EventTypeKey::of::<E>();
        let shared: Arc<dyn Any + Send + Sync> = event;

        let mut items: Vec<WorkItem> = Vec::new();
        for sub in self.registry.snapshot(key) {
            let event = Arc::clone(&shared);
            items.push(Box::pin(async move {
                // Honors unsubscribes that landed after this publish.
                if !sub.is_active() {
                    return;
                }
                sub.handler.invoke(event).await;
            }));
        }

        if let Some(provider) = &self.provider {
            if let Some(provided) = provider.handlers_for(key) {
                for handler in provided {
                    let event = Arc::clone(&shared);
                    items.push(Box::pin(async move {
                        handler.handler.invoke(event).await;
                    }));
                }
            }
        }

        if items.is_empty() {
            return;
        }
        log::trace!("publishing {} work item(s)", items.len());
        self.runner.submit(items).await;
    }

    /// Stops the underlying runner. Idempotent; never fails.
    pub async fn shutdown(&self) {
        self.runner.shutdown().await;
    }

    #[cfg(test)]
    pub(crate) fn subscription_count<E: Event>(&self) -> usize {
        self.registry.len(EventTypeKey::of::<E>())
    }
}
