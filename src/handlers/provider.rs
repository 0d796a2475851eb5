//! # External handler provider.
//!
//! Provides [`HandlerProvider`] — an optional collaborator the broker queries
//! once per publish for ad-hoc handler instances. Provided handlers are not
//! part of the subscription registry: they cannot be unsubscribed and are
//! invoked without the `active` re-check that registry subscriptions get.
//!
//! Typical uses: resolving handlers from a DI container, or constructing a
//! fresh stateful handler per event.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use eventcast::{EventTypeKey, FnHandler, HandlerProvider, ProvidedHandler};
//!
//! struct AuditProvider;
//!
//! impl HandlerProvider for AuditProvider {
//!     fn handlers_for(&self, key: EventTypeKey) -> Option<Vec<ProvidedHandler>> {
//!         if key != EventTypeKey::of::<String>() {
//!             return None;
//!         }
//!         let audit = Arc::new(FnHandler::new(|msg: &String| {
//!             println!("audit: {msg}");
//!         }));
//!         Some(vec![ProvidedHandler::new(audit)])
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::event::{Event, EventTypeKey};
use crate::handlers::erased::{ErasedHandler, TypedHandler};
use crate::handlers::Handle;

/// A type-erased handler instance returned by a [`HandlerProvider`].
pub struct ProvidedHandler {
    pub(crate) handler: Arc<dyn ErasedHandler>,
}

impl ProvidedHandler {
    /// Erases a typed handler for transport through the provider interface.
    ///
    /// The event type is captured here; a provider that returns a handler for
    /// the wrong key produces work items that are silently dropped.
    pub fn new<E: Event, H: Handle<E>>(handler: Arc<H>) -> Self {
        Self {
            handler: Arc::new(TypedHandler::new(handler)),
        }
    }
}

/// Supplier of ad-hoc, non-registry handler instances per event type.
///
/// Queried exactly once per publish. Returning `None` (or an empty vec) means
/// no ad-hoc handlers for this event.
pub trait HandlerProvider: Send + Sync {
    /// Returns handlers for events keyed by `key`, or `None`.
    fn handlers_for(&self, key: EventTypeKey) -> Option<Vec<ProvidedHandler>>;
}
