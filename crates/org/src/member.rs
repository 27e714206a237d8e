//! Member records and the role/status lifecycle.
//!
//! A member is never hard-deleted through the normal lifecycle: leaving a
//! division is a reversible withdrawal that keeps the record (and its
//! metadata) around for reinstatement. Only the narrow full-removal path
//! deletes the row, and it requires the member to already be divisionless.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clubhouse_core::{DivisionId, DomainError, DomainResult, Entity, MemberId};

use crate::division::DivisionKind;

// ─────────────────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────────────────

/// Organizational role held by a member.
///
/// `DivisionHead` carries the kind of the division it heads; the head role is
/// always derived from the stored [`DivisionKind`], never from name matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    President,
    DivisionHead(DivisionKind),
    Member,
}

impl Role {
    pub fn is_president(&self) -> bool {
        matches!(self, Role::President)
    }

    pub fn is_division_head(&self) -> bool {
        matches!(self, Role::DivisionHead(_))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::President => write!(f, "president"),
            Role::DivisionHead(kind) => write!(f, "{}_head", kind.as_str()),
            Role::Member => write!(f, "member"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Withdrawal metadata, present exactly while a member is withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub reason: String,
    pub actor: MemberId,
    pub occurred_at: DateTime<Utc>,
    pub former_division: DivisionId,
}

/// Member standing within the club.
///
/// Withdrawal and ban metadata live inside their variants, so the metadata
/// exists exactly when the status says it should.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    Banned { reason: String },
    Withdrawn(WithdrawalRecord),
}

impl MemberStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, MemberStatus::Active)
    }

    pub fn is_banned(&self) -> bool {
        matches!(self, MemberStatus::Banned { .. })
    }

    pub fn is_withdrawn(&self) -> bool {
        matches!(self, MemberStatus::Withdrawn(_))
    }
}

impl core::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MemberStatus::Active => write!(f, "active"),
            MemberStatus::Inactive => write!(f, "inactive"),
            MemberStatus::Banned { .. } => write!(f, "banned"),
            MemberStatus::Withdrawn(_) => write!(f, "withdrawn"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Member
// ─────────────────────────────────────────────────────────────────────────────

/// A registered club member.
///
/// # Invariants
/// - At most one member holds [`Role::President`] club-wide (the presidency
///   reference is owned by the `Club` record).
/// - A member with `Role::DivisionHead(k)` has `division_id` set to the
///   division of kind `k` that references them as head.
/// - A withdrawn member has `division_id = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub role: Role,
    pub division_id: Option<DivisionId>,
    pub status: MemberStatus,
    pub version: u64,
}

impl Member {
    /// Register a new member.
    ///
    /// Fresh members are `Active`, hold `Role::Member` and start
    /// email-unverified; the email is normalized to lowercase.
    pub fn register(name: &str, email: &str) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self {
            id: MemberId::new(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            email_verified: false,
            role: Role::Member,
            division_id: None,
            status: MemberStatus::Active,
            version: 0,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Attach the member to a division.
    ///
    /// Reinstates a withdrawn member: the status returns to `Active` and the
    /// withdrawal metadata is wiped. Any other standing is preserved.
    pub fn attach_to_division(&mut self, division_id: DivisionId) {
        self.division_id = Some(division_id);
        if self.status.is_withdrawn() {
            self.status = MemberStatus::Active;
        }
    }

    /// Withdraw the member from their current division (reversible
    /// soft-delete).
    ///
    /// Clears `division_id`, demotes a head role back to `Member` and stores
    /// the withdrawal metadata in the status.
    pub fn withdraw(&mut self, record: WithdrawalRecord) {
        self.division_id = None;
        if self.role.is_division_head() {
            self.role = Role::Member;
        }
        self.status = MemberStatus::Withdrawn(record);
    }
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &MemberId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn withdrawal(division_id: DivisionId) -> WithdrawalRecord {
        WithdrawalRecord {
            reason: "inactive".to_string(),
            actor: MemberId::new(),
            occurred_at: Utc::now(),
            former_division: division_id,
        }
    }

    #[test]
    fn register_normalizes_email_and_starts_unverified() {
        let member = Member::register("Alice", "  Alice@Example.COM ").unwrap();

        assert_eq!(member.email, "alice@example.com");
        assert!(!member.email_verified);
        assert_eq!(member.role, Role::Member);
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.division_id, None);
        assert_eq!(member.version, 0);
    }

    #[test]
    fn register_rejects_bad_input() {
        assert!(matches!(
            Member::register("   ", "a@example.com").unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            Member::register("Alice", "not-an-email").unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn withdraw_clears_division_and_demotes_head() {
        let division_id = DivisionId::new();
        let mut member = Member::register("Bob", "bob@example.com").unwrap();
        member.division_id = Some(division_id);
        member.role = Role::DivisionHead(DivisionKind::Cyber);

        member.withdraw(withdrawal(division_id));

        assert_eq!(member.division_id, None);
        assert_eq!(member.role, Role::Member);
        let MemberStatus::Withdrawn(record) = &member.status else {
            panic!("expected withdrawn status");
        };
        assert_eq!(record.reason, "inactive");
        assert_eq!(record.former_division, division_id);
    }

    #[test]
    fn attach_reinstates_withdrawn_member() {
        let old_division = DivisionId::new();
        let new_division = DivisionId::new();
        let mut member = Member::register("Carol", "carol@example.com").unwrap();
        member.division_id = Some(old_division);
        member.withdraw(withdrawal(old_division));

        member.attach_to_division(new_division);

        assert_eq!(member.division_id, Some(new_division));
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[test]
    fn attach_preserves_non_withdrawn_standing() {
        let mut member = Member::register("Dave", "dave@example.com").unwrap();
        member.status = MemberStatus::Inactive;

        member.attach_to_division(DivisionId::new());

        assert_eq!(member.status, MemberStatus::Inactive);
    }

    #[test]
    fn role_display_carries_division_kind() {
        assert_eq!(Role::President.to_string(), "president");
        assert_eq!(
            Role::DivisionHead(DivisionKind::Cyber).to_string(),
            "cyber_head"
        );
        assert_eq!(Role::Member.to_string(), "member");
    }
}
