//! Groups and soft-removable group membership rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clubhouse_core::{
    DivisionId, DomainError, DomainResult, Entity, GroupId, MemberId, MembershipId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Group
// ─────────────────────────────────────────────────────────────────────────────

/// A working group nested inside a division.
///
/// The owning `division_id` is required and immutable: a group cannot outlive
/// or detach from its division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub division_id: DivisionId,
    pub name: String,
    pub version: u64,
}

impl Group {
    pub fn create(division_id: DivisionId, name: &str) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("group name cannot be empty"));
        }

        Ok(Self {
            id: GroupId::new(),
            division_id,
            name: name.trim().to_string(),
            version: 0,
        })
    }
}

impl Entity for Group {
    type Id = GroupId;

    fn id(&self) -> &GroupId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Group Membership
// ─────────────────────────────────────────────────────────────────────────────

/// Removal metadata, present exactly while a membership row is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalRecord {
    pub reason: String,
    pub actor: MemberId,
    pub occurred_at: DateTime<Utc>,
}

/// Membership row state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    Active,
    Removed(RemovalRecord),
}

/// Link between a member and a group.
///
/// Rows are soft-removed, never deleted: the removal reason, actor and time
/// stay queryable, and re-adding the member reinstates the same row instead
/// of inserting a duplicate for the `(member, group)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: MembershipId,
    pub member_id: MemberId,
    pub group_id: GroupId,
    pub state: MembershipState,
    pub version: u64,
}

impl GroupMembership {
    /// Fresh active membership linking `member_id` into `group_id`.
    pub fn join(member_id: MemberId, group_id: GroupId) -> Self {
        Self {
            id: MembershipId::new(),
            member_id,
            group_id,
            state: MembershipState::Active,
            version: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, MembershipState::Active)
    }

    /// Soft-remove the row, recording why and by whom.
    pub fn remove(&mut self, record: RemovalRecord) -> DomainResult<()> {
        if !self.is_active() {
            return Err(DomainError::conflict("membership is already removed"));
        }
        self.state = MembershipState::Removed(record);
        Ok(())
    }

    /// Reinstate a previously removed row.
    pub fn reinstate(&mut self) -> DomainResult<()> {
        if self.is_active() {
            return Err(DomainError::conflict("membership is already active"));
        }
        self.state = MembershipState::Active;
        Ok(())
    }
}

impl Entity for GroupMembership {
    type Id = MembershipId;

    fn id(&self) -> &MembershipId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
