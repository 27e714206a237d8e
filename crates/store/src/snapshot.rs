//! Consistent read view over the organizational collections.

use std::collections::HashMap;

use clubhouse_core::{DivisionId, DomainError, DomainResult, GroupId, MemberId, MembershipId};
use clubhouse_org::{Club, Division, Group, GroupMembership, Member};

/// Point-in-time view of every collection plus the club record.
///
/// Accessors return owned clones: callers mutate their copy and hand it back
/// through an `OrgTransaction`, whose expected versions were captured here.
#[derive(Debug, Clone)]
pub struct OrgSnapshot {
    club: Club,
    members: HashMap<MemberId, Member>,
    divisions: HashMap<DivisionId, Division>,
    groups: HashMap<GroupId, Group>,
    memberships: HashMap<MembershipId, GroupMembership>,
}

impl OrgSnapshot {
    pub fn new(
        club: Club,
        members: Vec<Member>,
        divisions: Vec<Division>,
        groups: Vec<Group>,
        memberships: Vec<GroupMembership>,
    ) -> Self {
        Self {
            club,
            members: members.into_iter().map(|m| (m.id, m)).collect(),
            divisions: divisions.into_iter().map(|d| (d.id, d)).collect(),
            groups: groups.into_iter().map(|g| (g.id, g)).collect(),
            memberships: memberships.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Point lookups
    // ─────────────────────────────────────────────────────────────────────────

    pub fn club(&self) -> Club {
        self.club.clone()
    }

    pub fn member(&self, id: MemberId) -> DomainResult<Member> {
        self.members
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("member"))
    }

    pub fn division(&self, id: DivisionId) -> DomainResult<Division> {
        self.divisions
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("division"))
    }

    pub fn group(&self, id: GroupId) -> DomainResult<Group> {
        self.groups
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("group"))
    }

    pub fn membership(&self, id: MembershipId) -> DomainResult<GroupMembership> {
        self.memberships
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("membership"))
    }

    /// The membership row for a `(member, group)` pair, regardless of state.
    pub fn membership_for(&self, member_id: MemberId, group_id: GroupId) -> Option<GroupMembership> {
        self.memberships
            .values()
            .find(|m| m.member_id == member_id && m.group_id == group_id)
            .cloned()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn divisions(&self) -> impl Iterator<Item = &Division> {
        self.divisions.values()
    }

    pub fn division_by_name(&self, name: &str) -> Option<Division> {
        self.divisions
            .values()
            .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
    }

    pub fn group_by_name(&self, division_id: DivisionId, name: &str) -> Option<Group> {
        self.groups
            .values()
            .find(|g| g.division_id == division_id && g.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
    }

    pub fn groups_in_division(&self, division_id: DivisionId) -> Vec<Group> {
        self.groups
            .values()
            .filter(|g| g.division_id == division_id)
            .cloned()
            .collect()
    }

    pub fn members_in_division(&self, division_id: DivisionId) -> Vec<Member> {
        self.members
            .values()
            .filter(|m| m.division_id == Some(division_id))
            .cloned()
            .collect()
    }

    /// Membership rows in `group` that are live: the row itself is active
    /// and the member still exists and still belongs to the group's division.
    ///
    /// Rows of withdrawn or purged members are inert history, not live
    /// membership. A withdrawn member has no division, so their rows fall
    /// out of this view without being touched.
    pub fn live_memberships_in_group(&self, group: &Group) -> Vec<GroupMembership> {
        self.memberships
            .values()
            .filter(|m| m.group_id == group.id && m.is_active())
            .filter(|m| {
                self.members
                    .get(&m.member_id)
                    .is_some_and(|member| member.division_id == Some(group.division_id))
            })
            .cloned()
            .collect()
    }
}
