//! Event payload marker and the type tag used for routing.
//!
//! Any `Send + Sync + 'static` value can be published as an event; the broker
//! routes it by [`EventTypeKey`], an explicit runtime type tag. Matching is
//! exact: publishing a `ChildEvent` never reaches `ParentEvent` subscribers.

use std::any::TypeId;

/// Marker for types that can travel through the broker.
///
/// Blanket-implemented for every `Send + Sync + 'static` type; events are
/// shared with handlers behind an `Arc`, so `Clone` is not required.
pub trait Event: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Event for T {}

/// Identifier distinguishing event payload types.
///
/// Wraps [`TypeId`], so two keys compare equal exactly when they were produced
/// from the same Rust type. There is no subtype or trait-object matching.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EventTypeKey(TypeId);

impl EventTypeKey {
    /// Returns the key for event type `E`.
    pub fn of<E: Event>() -> Self {
        EventTypeKey(TypeId::of::<E>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tick;
    struct Tock;

    #[test]
    fn same_type_produces_equal_keys() {
        assert_eq!(EventTypeKey::of::<Tick>(), EventTypeKey::of::<Tick>());
    }

    #[test]
    fn distinct_types_produce_distinct_keys() {
        assert_ne!(EventTypeKey::of::<Tick>(), EventTypeKey::of::<Tock>());
        assert_ne!(EventTypeKey::of::<String>(), EventTypeKey::of::<&str>());
    }
}
