//! # Event handler trait.
//!
//! Provides [`Handle`] — the capability a subscription registers for one
//! event type: an optional filter, the handler body, and an optional error
//! callback.
//!
//! ## Rules
//! - [`Handle::should_handle`] returning `false` skips the invocation
//!   entirely; `on_error` is not involved.
//! - An `Err` from [`Handle::handle`] (or a panic inside it) is delivered to
//!   [`Handle::on_error`] for the same event, exactly once.
//! - Failures never propagate to the publisher or the runner; a broken
//!   handler cannot stall dispatch for other subscriptions.
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use eventcast::{Handle, HandlerError};
//!
//! struct OrderPlaced { total_cents: u64 }
//!
//! struct LargeOrderAlert;
//!
//! #[async_trait]
//! impl Handle<OrderPlaced> for LargeOrderAlert {
//!     fn should_handle(&self, event: &OrderPlaced) -> bool {
//!         event.total_cents >= 100_00
//!     }
//!
//!     async fn handle(&self, event: &OrderPlaced) -> Result<(), HandlerError> {
//!         println!("large order: {} cents", event.total_cents);
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::event::Event;

/// Handling logic for events of type `E`.
///
/// Implementations run on runner workers, not on the publishing task. They
/// must not assume any ordering relative to other handlers of the same event.
#[async_trait]
pub trait Handle<E: Event>: Send + Sync + 'static {
    /// Processes one event.
    ///
    /// Returning an error routes it to [`Handle::on_error`]; it is never
    /// visible to the publisher.
    async fn handle(&self, event: &E) -> Result<(), HandlerError>;

    /// Decides whether [`Handle::handle`] should run for this event.
    ///
    /// Checked immediately before the invocation, on the worker. Default:
    /// always handle.
    fn should_handle(&self, _event: &E) -> bool {
        true
    }

    /// Called when [`Handle::handle`] failed or panicked for `event`.
    ///
    /// A panic inside this callback is caught and discarded. Default: no-op.
    async fn on_error(&self, _error: &HandlerError, _event: &E) {}
}
