//! # Type-erased dispatch and the per-invocation isolation wrapper.
//!
//! The registry stores subscriptions for arbitrary event types in one map, so
//! the typed [`Handle`] capability is erased behind [`ErasedHandler`]: the
//! event travels as `Arc<dyn Any + Send + Sync>` and is downcast back to its
//! concrete type at invocation time.
//!
//! ## Isolation state machine (per invocation)
//! ```text
//! should_handle? ──false──► skip (no error path)
//!       │true
//!       ▼
//!    handle ──Ok──► done
//!       │Err / panic
//!       ▼
//!    on_error(error, event) ── panic? caught and discarded
//! ```
//!
//! Nothing escapes this wrapper: a worker that awaits the resulting future
//! can never be crashed by handler code.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::HandlerError;
use crate::event::Event;
use crate::handlers::Handle;

/// Object-safe face of a typed handler, used by the registry and provider.
pub(crate) trait ErasedHandler: Send + Sync {
    /// Runs the full isolated invocation against a type-erased event.
    ///
    /// An event of an unexpected type is dropped; this can only happen with a
    /// misbehaving [`HandlerProvider`](crate::HandlerProvider).
    fn invoke(&self, event: Arc<dyn Any + Send + Sync>) -> BoxFuture<'static, ()>;
}

/// Bridges a typed `Handle<E>` into [`ErasedHandler`].
pub(crate) struct TypedHandler<E, H: ?Sized> {
    handler: Arc<H>,
    _event: PhantomData<fn(&E)>,
}

impl<E: Event, H: Handle<E> + ?Sized> TypedHandler<E, H> {
    pub(crate) fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            _event: PhantomData,
        }
    }
}

impl<E: Event, H: Handle<E> + ?Sized> ErasedHandler for TypedHandler<E, H> {
    fn invoke(&self, event: Arc<dyn Any + Send + Sync>) -> BoxFuture<'static, ()> {
        let handler = Arc::clone(&self.handler);
        Box::pin(async move {
            let Ok(event) = event.downcast::<E>() else {
                log::debug!("dropping work item: event type did not match handler");
                return;
            };
            run_isolated(handler.as_ref(), event.as_ref()).await;
        })
    }
}

/// Runs one handler invocation, keeping every failure inside.
pub(crate) async fn run_isolated<E: Event, H: Handle<E> + ?Sized>(handler: &H, event: &E) {
    let attempt = AssertUnwindSafe(async {
        if !handler.should_handle(event) {
            return Ok(());
        }
        handler.handle(event).await
    })
    .catch_unwind()
    .await;

    let error = match attempt {
        Ok(Ok(())) => return,
        Ok(Err(error)) => error,
        Err(payload) => HandlerError::Panic {
            info: panic_info(payload.as_ref()),
        },
    };

    // Second-order isolation: a broken error callback must not destabilize
    // the worker either.
    let _ = AssertUnwindSafe(handler.on_error(&error, event))
        .catch_unwind()
        .await;
}

fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
