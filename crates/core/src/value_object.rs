//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: a monthly demand
/// point or a whole demand series has no identity of its own, two series with
/// the same points are the same series.
///
/// The trait requires:
/// - **Clone**: values are copied freely between pipeline stages
/// - **PartialEq**: comparison is by attribute values
/// - **Debug**: values show up in logs and test failures
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
