//! Entity trait.
//!
//! Every persisted organizational record implements [`Entity`]: a stable
//! identity plus a monotonically increasing version used for optimistic
//! concurrency control. Versions start at `0` on a freshly constructed
//! (not yet committed) record and are bumped by the store on every commit.

/// A persisted record with identity and a concurrency version.
pub trait Entity {
    /// The strongly-typed identifier for this entity.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Stable identity of the entity.
    fn id(&self) -> &Self::Id;

    /// Current persisted version. `0` means "never committed".
    fn version(&self) -> u64;
}
