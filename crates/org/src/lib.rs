//! `clubhouse-org` — pure organizational domain model.
//!
//! Entities, role/status state machines and the invariant checks composed by
//! the engine services. Intentionally free of storage and transport concerns.

pub mod club;
pub mod division;
pub mod events;
pub mod group;
pub mod member;
pub mod validate;

pub use club::Club;
pub use division::{Division, DivisionKind};
pub use events::OrgEvent;
pub use group::{Group, GroupMembership, MembershipState, RemovalRecord};
pub use member::{Member, MemberStatus, Role, WithdrawalRecord};
