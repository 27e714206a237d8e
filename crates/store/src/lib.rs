//! `clubhouse-store` — transactional persistence boundary.
//!
//! Exactly one store interface serves every reader and writer, so the
//! invariant checks always observe a single consistent view and every
//! multi-entity mutation commits atomically or not at all.

pub mod memory;
pub mod snapshot;
pub mod store;
pub mod txn;

pub use memory::InMemoryOrgStore;
pub use snapshot::OrgSnapshot;
pub use store::{OrgStore, StoreError};
pub use txn::{OrgTransaction, Write};
