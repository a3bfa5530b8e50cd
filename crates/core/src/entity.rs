//! Entity marker trait: identity-based domain objects.

/// Marker + minimal interface for stored domain entities.
///
/// Entities are compared by identity; their attributes may change over their
/// lifecycle while the identifier stays stable.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
