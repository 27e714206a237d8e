//! Actor context consumed uniformly by every engine operation.

use serde::{Deserialize, Serialize};

use clubhouse_core::{DomainError, DomainResult, MemberId};

/// Role claim carried by an authenticated caller.
///
/// Claims are coarse: a `DivisionHead` claim says the caller heads *some*
/// division. Which one is never trusted from the claim set but looked up
/// from stored state when a division-scoped operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClaim {
    President,
    DivisionHead,
    Member,
}

/// The authenticated caller of an engine operation.
///
/// Supplied by the outer authentication layer with its claims already
/// verified; the engine trusts the identity and re-checks authorization
/// logic on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub member_id: MemberId,
    pub roles: Vec<RoleClaim>,
}

impl ActorContext {
    pub fn new(member_id: MemberId, roles: Vec<RoleClaim>) -> Self {
        Self { member_id, roles }
    }

    /// Context for a caller holding the president claim.
    pub fn president(member_id: MemberId) -> Self {
        Self::new(member_id, vec![RoleClaim::President])
    }

    /// Context for a caller holding a division-head claim.
    pub fn division_head(member_id: MemberId) -> Self {
        Self::new(member_id, vec![RoleClaim::DivisionHead, RoleClaim::Member])
    }

    /// Context for an ordinary member.
    pub fn member(member_id: MemberId) -> Self {
        Self::new(member_id, vec![RoleClaim::Member])
    }

    pub fn is_president(&self) -> bool {
        self.roles.contains(&RoleClaim::President)
    }

    /// Require the president claim.
    pub fn ensure_president(&self) -> DomainResult<()> {
        if self.is_president() {
            Ok(())
        } else {
            Err(DomainError::forbidden("president role required"))
        }
    }
}
