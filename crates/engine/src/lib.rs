//! `clubhouse-engine` — organizational lifecycle orchestration.
//!
//! The services in this crate compose the snapshot/commit store with the
//! pure domain checks from `clubhouse-org`: every operation reads one
//! consistent snapshot, validates against it, and commits a single
//! version-guarded transaction, so partial application is never observable
//! and concurrent writers collide on entity versions instead of racing.
//! Audit records and outbound notifications are emitted only after the
//! commit succeeds, and their failures never fail the operation.

pub mod admin;
pub mod audit;
pub mod clock;
pub mod error;
pub mod membership;
pub mod roles;

mod access;


pub use admin::{AdminService, Standing};
pub use audit::AuditNotifier;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::EngineError;
pub use membership::{DivisionAttachment, MembershipService};
pub use roles::{HeadAssignment, HeadRemoval, RoleService};
