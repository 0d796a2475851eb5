//! Error types used by the eventcast runtime and handlers.
//!
//! This module defines two main error enums:
//!
//! - [`ConfigError`] — invalid runner configuration, raised synchronously at
//!   construction time and never retried.
//! - [`HandlerError`] — failures raised by individual handler invocations,
//!   routed to the subscription's `on_error` callback and nowhere else.
//!
//! Both types provide `as_label` for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by runner construction.
///
/// These are the only errors the crate surfaces to callers: a broker never
/// fails to publish or subscribe, but a runner refuses to start with a
/// configuration that cannot keep its contracts.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A count parameter (worker count, concurrency cap, cycle count) was zero.
    #[error("{name} must be a positive integer (was {value})")]
    NonPositive {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// An interval parameter was zero.
    #[error("{name} must be a positive duration (was {value:?})")]
    ZeroInterval {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: Duration,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventcast::ConfigError;
    ///
    /// let err = ConfigError::NonPositive { name: "worker_count", value: 0 };
    /// assert_eq!(err.as_label(), "config_non_positive");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NonPositive { .. } => "config_non_positive",
            ConfigError::ZeroInterval { .. } => "config_zero_interval",
        }
    }
}

/// # Errors produced by handler execution.
///
/// A handler either returns [`HandlerError::Fail`] itself or panics, in which
/// case the isolation wrapper converts the panic into [`HandlerError::Panic`].
/// Either way the error is delivered to that subscription's `on_error` and
/// never reaches the runner, the broker, or the publisher.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum HandlerError {
    /// Handler reported a failure for this event.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked while processing this event.
    #[error("handler panicked: {info}")]
    Panic {
        /// Rendered panic payload.
        info: String,
    },
}

impl HandlerError {
    /// Creates a [`HandlerError::Fail`] from any displayable error.
    pub fn fail(error: impl ToString) -> Self {
        HandlerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panic { .. } => "handler_panicked",
        }
    }

    /// Returns `true` if this error was recovered from a panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panic { .. })
    }
}
