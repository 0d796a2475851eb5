//! Event handlers: the capability trait, adapters, and isolation.
//!
//! ## Contents
//! - [`Handle`] — the subscription capability (filter, body, error callback)
//! - [`FnHandler`] — synthesizes the capability from plain closures
//! - [`HandlerProvider`], [`ProvidedHandler`] — ad-hoc handlers resolved at
//!   publish time
//! - `erased` (crate-internal) — type-erased dispatch plus the isolation
//!   wrapper every invocation runs inside
//!
//! ## Quick reference
//! - **Registered path**: `Broker::subscribe` wraps a `Handle<E>` and stores
//!   it in the registry; invocations re-check the subscription's `active`
//!   flag at execution time.
//! - **Provided path**: `HandlerProvider::handlers_for` supplies handlers per
//!   publish; no re-check, they cannot be unsubscribed.

mod erased;
mod func;
mod handler;
mod provider;

pub use func::FnHandler;
pub use handler::Handle;
pub use provider::{HandlerProvider, ProvidedHandler};

pub(crate) use erased::{ErasedHandler, TypedHandler};
