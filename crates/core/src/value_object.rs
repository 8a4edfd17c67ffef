//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** - identity does
/// not matter, only the attribute values do. `Money` and `Qty` are the
/// canonical instances here: two amounts of 100 are the same amount, and
/// "modifying" one means producing a new value.
///
/// The trait bounds keep them cheap to copy around the engine and easy to
/// assert on in tests:
/// - **Clone**: values are passed and stored freely
/// - **PartialEq**: compared by attribute values
/// - **Debug**: printable in logs and test failures
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
