//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two identities decoded
/// from the same item code, or two handles for the same transaction, are the same
/// value. Item identities, transaction ids and contract addresses are value objects.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
