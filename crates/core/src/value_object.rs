//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two periods for
/// the same year and month are the same period, two events with the same
/// location and day are the same event.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
