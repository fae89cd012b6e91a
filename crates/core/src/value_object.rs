//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity of their own: two instances with the same
/// attribute values are interchangeable. In this workspace that covers derived
/// data such as restock suggestions and scheduled alert requests, which are
/// recomputed rather than stored.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
