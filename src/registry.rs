//! # Type-keyed subscription registry.
//!
//! Maps [`EventTypeKey`] to the ordered list of subscriptions for that event
//! type. One registry per broker instance; there is no process-wide state.
//!
//! ## Rules
//! - **Add** appends in insertion order and never fails.
//! - **Remove** is atomic: matching entries leave the list and are tombstoned
//!   (`active = false`) under the same write lock, so a concurrent snapshot
//!   sees either the pre- or post-removal list, never a torn one.
//! - **Snapshot** is a point-in-time clone usable for one publish, immune to
//!   later mutation. An unknown key yields an empty list.
//! - A tombstoned subscription is never resurrected; work items built from an
//!   earlier snapshot observe the flag at execution time and skip themselves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::event::EventTypeKey;
use crate::handlers::ErasedHandler;

/// Opaque handle identifying one subscription.
///
/// Returned by `Broker::subscribe*`; pass it to `Broker::unsubscribe` to
/// remove exactly that subscription. Copyable, comparable, and valid for the
/// lifetime of the broker (unsubscribing twice is a no-op).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionToken {
    key: EventTypeKey,
    id: u64,
}

impl SubscriptionToken {
    /// Returns the event type this subscription was registered for.
    pub fn event_key(&self) -> EventTypeKey {
        self.key
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

/// One registered (handler, filter, error-callback) capability.
///
/// The `active` flag is shared with every work item built from this
/// subscription; flipping it is the only mechanism that suppresses
/// queued-but-not-yet-run invocations.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) id: u64,
    /// Identity of the original handler allocation, for the legacy
    /// reference-equality unsubscribe path.
    pub(crate) handler_ptr: usize,
    pub(crate) active: Arc<AtomicBool>,
    pub(crate) handler: Arc<dyn ErasedHandler>,
}

impl Subscription {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Mutation-safe collection of active subscriptions, keyed by event type.
pub(crate) struct SubscriptionRegistry {
    entries: RwLock<HashMap<EventTypeKey, Vec<Subscription>>>,
    next_id: AtomicU64,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Appends a subscription to the type's list.
    pub(crate) fn add(
        &self,
        key: EventTypeKey,
        handler_ptr: usize,
        handler: Arc<dyn ErasedHandler>,
    ) -> SubscriptionToken {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscription = Subscription {
            id,
            handler_ptr,
            active: Arc::new(AtomicBool::new(true)),
            handler,
        };
        self.write().entry(key).or_default().push(subscription);
        SubscriptionToken { key, id }
    }

    /// Removes every subscription under `key` matching the predicate,
    /// tombstoning each removed entry.
    pub(crate) fn remove(&self, key: EventTypeKey, matches: impl Fn(&Subscription) -> bool) {
        let mut entries = self.write();
        if let Some(list) = entries.get_mut(&key) {
            list.retain(|subscription| {
                if matches(subscription) {
                    subscription.active.store(false, Ordering::Release);
                    false
                } else {
                    true
                }
            });
        }
    }

    /// Returns a point-in-time copy of the type's subscription list.
    pub(crate) fn snapshot(&self, key: EventTypeKey) -> Vec<Subscription> {
        self.read().get(&key).cloned().unwrap_or_default()
    }

    /// Number of live subscriptions for `key`.
    pub(crate) fn len(&self, key: EventTypeKey) -> usize {
        self.read().get(&key).map_or(0, Vec::len)
    }

    fn read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<EventTypeKey, Vec<Subscription>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<EventTypeKey, Vec<Subscription>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
