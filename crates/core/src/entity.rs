//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Items and warehouses are entities: their attributes may change but the
/// identifier stays stable, and ledger streams key off that identifier.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
