//! # Closure-backed handler.
//!
//! Provides [`FnHandler`] — synthesizes the [`Handle`] capability from up to
//! three independent callables: the handler body, an optional filter, and an
//! optional error callback. Omitted pieces fall back to the trait defaults
//! (always handle, ignore errors).
//!
//! ## Example
//! ```
//! use eventcast::FnHandler;
//!
//! let handler = FnHandler::new(|tick: &u64| println!("tick {tick}"))
//!     .with_filter(|tick| tick % 2 == 0)
//!     .with_on_error(|err, _tick| eprintln!("{err}"));
//! # let _ = handler;
//! ```

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::event::Event;
use crate::handlers::Handle;

type HandlerFn<E> = Box<dyn Fn(&E) -> Result<(), HandlerError> + Send + Sync>;
type FilterFn<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;
type ErrorFn<E> = Box<dyn Fn(&HandlerError, &E) + Send + Sync>;

/// [`Handle`] implementation built from plain closures.
pub struct FnHandler<E> {
    handler: HandlerFn<E>,
    filter: Option<FilterFn<E>>,
    on_error: Option<ErrorFn<E>>,
}

impl<E: Event> FnHandler<E> {
    /// Wraps an infallible closure.
    pub fn new(handler: impl Fn(&E) + Send + Sync + 'static) -> Self {
        Self::fallible(move |event| {
            handler(event);
            Ok(())
        })
    }

    /// Wraps a closure that may report failures.
    pub fn fallible(
        handler: impl Fn(&E) -> Result<(), HandlerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            filter: None,
            on_error: None,
        }
    }

    /// Sets the filter; events for which it returns `false` are skipped.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Sets the error callback invoked when the handler fails or panics.
    #[must_use]
    pub fn with_on_error(
        mut self,
        on_error: impl Fn(&HandlerError, &E) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

#[async_trait]
impl<E: Event> Handle<E> for FnHandler<E> {
    async fn handle(&self, event: &E) -> Result<(), HandlerError> {
        (self.handler)(event)
    }

    fn should_handle(&self, event: &E) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    async fn on_error(&self, error: &HandlerError, event: &E) {
        if let Some(on_error) = &self.on_error {
            on_error(error, event);
        }
    }
}
