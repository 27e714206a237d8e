//! Version-guarded write batches.

use serde::{Deserialize, Serialize};

use clubhouse_core::{DivisionId, ExpectedVersion, GroupId, MemberId};
use clubhouse_org::{Club, Division, Group, GroupMembership, Member};

/// A single write in a batch.
///
/// Creates commit freshly constructed (version 0) entities at version 1;
/// updates and deletes carry the version captured at snapshot time as their
/// expectation. Group rows are immutable once created and membership rows are
/// soft-removed rather than deleted, so neither has an update/delete
/// counterpart here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Write {
    PutClub {
        club: Club,
        expected: ExpectedVersion,
    },
    CreateMember {
        member: Member,
    },
    UpdateMember {
        member: Member,
        expected: ExpectedVersion,
    },
    DeleteMember {
        member_id: MemberId,
        expected: ExpectedVersion,
    },
    CreateDivision {
        division: Division,
    },
    UpdateDivision {
        division: Division,
        expected: ExpectedVersion,
    },
    DeleteDivision {
        division_id: DivisionId,
        expected: ExpectedVersion,
    },
    CreateGroup {
        group: Group,
    },
    DeleteGroup {
        group_id: GroupId,
        expected: ExpectedVersion,
    },
    CreateMembership {
        membership: GroupMembership,
    },
    UpdateMembership {
        membership: GroupMembership,
        expected: ExpectedVersion,
    },
}

/// An atomic multi-entity write batch.
///
/// Built from entities read off one snapshot. Every builder method captures
/// the entity's current version as the commit expectation, bumps the copy it
/// records, and returns that post-image. What the caller returns to *its*
/// caller is exactly what the store will hold once the commit succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgTransaction {
    writes: Vec<Write>,
}

impl OrgTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Club
    // ─────────────────────────────────────────────────────────────────────────

    pub fn put_club(&mut self, club: Club) -> Club {
        let expected = ExpectedVersion::Exact(club.version);
        let mut next = club;
        next.version += 1;
        self.writes.push(Write::PutClub {
            club: next.clone(),
            expected,
        });
        next
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Members
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_member(&mut self, member: Member) -> Member {
        let mut next = member;
        next.version = 1;
        self.writes.push(Write::CreateMember {
            member: next.clone(),
        });
        next
    }

    pub fn update_member(&mut self, member: Member) -> Member {
        let expected = ExpectedVersion::Exact(member.version);
        let mut next = member;
        next.version += 1;
        self.writes.push(Write::UpdateMember {
            member: next.clone(),
            expected,
        });
        next
    }

    pub fn delete_member(&mut self, member: &Member) {
        self.writes.push(Write::DeleteMember {
            member_id: member.id,
            expected: ExpectedVersion::Exact(member.version),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Divisions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_division(&mut self, division: Division) -> Division {
        let mut next = division;
        next.version = 1;
        self.writes.push(Write::CreateDivision {
            division: next.clone(),
        });
        next
    }

    pub fn update_division(&mut self, division: Division) -> Division {
        let expected = ExpectedVersion::Exact(division.version);
        let mut next = division;
        next.version += 1;
        self.writes.push(Write::UpdateDivision {
            division: next.clone(),
            expected,
        });
        next
    }

    pub fn delete_division(&mut self, division: &Division) {
        self.writes.push(Write::DeleteDivision {
            division_id: division.id,
            expected: ExpectedVersion::Exact(division.version),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Groups
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_group(&mut self, group: Group) -> Group {
        let mut next = group;
        next.version = 1;
        self.writes.push(Write::CreateGroup {
            group: next.clone(),
        });
        next
    }

    pub fn delete_group(&mut self, group: &Group) {
        self.writes.push(Write::DeleteGroup {
            group_id: group.id,
            expected: ExpectedVersion::Exact(group.version),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Memberships
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_membership(&mut self, membership: GroupMembership) -> GroupMembership {
        let mut next = membership;
        next.version = 1;
        self.writes.push(Write::CreateMembership {
            membership: next.clone(),
        });
        next
    }

    pub fn update_membership(&mut self, membership: GroupMembership) -> GroupMembership {
        let expected = ExpectedVersion::Exact(membership.version);
        let mut next = membership;
        next.version += 1;
        self.writes.push(Write::UpdateMembership {
            membership: next.clone(),
            expected,
        });
        next
    }
}
