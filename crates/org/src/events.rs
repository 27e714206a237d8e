//! Organizational audit events.
//!
//! One event per successful engine operation, recorded to the audit sink
//! after commit. Every event names the actor who caused it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clubhouse_audit::AuditEvent;
use clubhouse_core::{DivisionId, GroupId, MemberId};

use crate::division::DivisionKind;
use crate::member::MemberStatus;

/// Audit record of a completed organizational state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrgEvent {
    MemberRegistered {
        member_id: MemberId,
        email: String,
        occurred_at: DateTime<Utc>,
    },
    EmailVerified {
        member_id: MemberId,
        occurred_at: DateTime<Utc>,
    },
    PresidentPromoted {
        member_id: MemberId,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    HeadAssigned {
        division_id: DivisionId,
        member_id: MemberId,
        previous_head: Option<MemberId>,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    HeadRemoved {
        division_id: DivisionId,
        member_id: MemberId,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    MemberAttached {
        division_id: DivisionId,
        member_id: MemberId,
        group_id: GroupId,
        /// Whether this attachment reinstated a withdrawn member.
        reinstated: bool,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    MemberWithdrawn {
        division_id: DivisionId,
        member_id: MemberId,
        reason: String,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    GroupJoined {
        group_id: GroupId,
        member_id: MemberId,
        /// Whether this join reinstated a soft-removed membership row.
        reinstated: bool,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    GroupMemberRemoved {
        group_id: GroupId,
        member_id: MemberId,
        reason: String,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    MemberPurged {
        member_id: MemberId,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    StandingChanged {
        member_id: MemberId,
        status: MemberStatus,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    DivisionCreated {
        division_id: DivisionId,
        division_kind: DivisionKind,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    DivisionDeleted {
        division_id: DivisionId,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    GroupCreated {
        group_id: GroupId,
        division_id: DivisionId,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
    GroupDeleted {
        group_id: GroupId,
        actor: MemberId,
        occurred_at: DateTime<Utc>,
    },
}

impl AuditEvent for OrgEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrgEvent::MemberRegistered { .. } => "org.member.registered",
            OrgEvent::EmailVerified { .. } => "org.member.email_verified",
            OrgEvent::PresidentPromoted { .. } => "org.club.president_promoted",
            OrgEvent::HeadAssigned { .. } => "org.division.head_assigned",
            OrgEvent::HeadRemoved { .. } => "org.division.head_removed",
            OrgEvent::MemberAttached { .. } => "org.division.member_attached",
            OrgEvent::MemberWithdrawn { .. } => "org.division.member_withdrawn",
            OrgEvent::GroupJoined { .. } => "org.group.member_joined",
            OrgEvent::GroupMemberRemoved { .. } => "org.group.member_removed",
            OrgEvent::MemberPurged { .. } => "org.member.purged",
            OrgEvent::StandingChanged { .. } => "org.member.standing_changed",
            OrgEvent::DivisionCreated { .. } => "org.division.created",
            OrgEvent::DivisionDeleted { .. } => "org.division.deleted",
            OrgEvent::GroupCreated { .. } => "org.group.created",
            OrgEvent::GroupDeleted { .. } => "org.group.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrgEvent::MemberRegistered { occurred_at, .. }
            | OrgEvent::EmailVerified { occurred_at, .. }
            | OrgEvent::PresidentPromoted { occurred_at, .. }
            | OrgEvent::HeadAssigned { occurred_at, .. }
            | OrgEvent::HeadRemoved { occurred_at, .. }
            | OrgEvent::MemberAttached { occurred_at, .. }
            | OrgEvent::MemberWithdrawn { occurred_at, .. }
            | OrgEvent::GroupJoined { occurred_at, .. }
            | OrgEvent::GroupMemberRemoved { occurred_at, .. }
            | OrgEvent::MemberPurged { occurred_at, .. }
            | OrgEvent::StandingChanged { occurred_at, .. }
            | OrgEvent::DivisionCreated { occurred_at, .. }
            | OrgEvent::DivisionDeleted { occurred_at, .. }
            | OrgEvent::GroupCreated { occurred_at, .. }
            | OrgEvent::GroupDeleted { occurred_at, .. } => *occurred_at,
        }
    }
}
