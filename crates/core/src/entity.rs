//! Entity trait: records that keep their identity across the host's edits.

/// Entity marker + minimal interface.
///
/// Every record handed over by the host (invoice, partner, attachment...)
/// carries a stable identifier; grouping and deduplication key on it.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
