//! Entity trait: identity + continuity across state changes.

use crate::id::RecordId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Position of the entity with the given id in an ordered collection.
pub fn position_of<E>(records: &[E], id: &RecordId) -> Option<usize>
where
    E: Entity<Id = RecordId>,
{
    records.iter().position(|r| r.id() == id)
}
