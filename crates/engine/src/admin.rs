//! Registration, division/group administration and standing management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use clubhouse_auth::ActorContext;
use clubhouse_audit::{Notification, NotificationTemplate};
use clubhouse_core::{DivisionId, GroupId, MemberId};
use clubhouse_org::{Division, DivisionKind, Group, Member, MemberStatus, OrgEvent, Role};
use clubhouse_store::{OrgStore, OrgTransaction};

use crate::access;
use crate::audit::AuditNotifier;
use crate::clock::Clock;
use crate::error::EngineError;

/// Target standing for [`AdminService::set_member_standing`].
///
/// Bans run through their own president-only operations; this toggles the
/// dormancy flag only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Active,
    Inactive,
}

/// Administrative operations around the membership lifecycle.
///
/// Same discipline as the lifecycle services: one snapshot, validation
/// against it, one version-guarded commit, audit afterwards. None of the
/// standing operations touch a member's division attachment.
pub struct AdminService<S> {
    store: S,
    audit: AuditNotifier,
    clock: Arc<dyn Clock>,
}

impl<S> AdminService<S> {
    pub fn new(store: S, audit: AuditNotifier, clock: Arc<dyn Clock>) -> Self {
        Self { store, audit, clock }
    }
}

impl<S> AdminService<S>
where
    S: OrgStore,
{
    /// Register a new member: active, unverified, no division.
    pub fn register_member(&self, name: &str, email: &str) -> Result<Member, EngineError> {
        let member = Member::register(name, email)?;

        let mut txn = OrgTransaction::new();
        let member = txn.create_member(member);
        self.store.commit(txn)?;

        self.audit.emit(
            OrgEvent::MemberRegistered {
                member_id: member.id,
                email: member.email.clone(),
                occurred_at: self.clock.now(),
            },
            Some(Notification {
                template: NotificationTemplate::EmailVerification,
                recipient: member.id,
                body: serde_json::json!({ "email": member.email }),
            }),
        );

        Ok(member)
    }

    /// Mark a member's email as verified. Idempotent.
    ///
    /// Called by the outer verification flow once its token checks pass.
    pub fn verify_member_email(&self, member_id: MemberId) -> Result<Member, EngineError> {
        let snapshot = self.store.snapshot()?;
        let mut member = snapshot.member(member_id)?;
        if member.email_verified {
            return Ok(member);
        }

        member.email_verified = true;
        let mut txn = OrgTransaction::new();
        let member = txn.update_member(member);
        self.store.commit(txn)?;

        self.audit.emit(
            OrgEvent::EmailVerified {
                member_id: member.id,
                occurred_at: self.clock.now(),
            },
            None,
        );

        Ok(member)
    }

    /// Create a division of the given kind. President-only.
    ///
    /// Kind labels are parsed at the boundary via `DivisionKind::from_str`,
    /// which fails closed; by the time a kind reaches here it is one of the
    /// known variants. Division names are unique club-wide.
    pub fn create_division(
        &self,
        name: &str,
        kind: DivisionKind,
        actor: &ActorContext,
    ) -> Result<Division, EngineError> {
        actor.ensure_president()?;

        let snapshot = self.store.snapshot()?;
        if snapshot.division_by_name(name).is_some() {
            return Err(EngineError::Conflict(format!(
                "a division named {} already exists",
                name.trim()
            )));
        }

        let division = Division::create(name, kind)?;
        let mut txn = OrgTransaction::new();
        let division = txn.create_division(division);
        self.store.commit(txn)?;

        self.audit.emit(
            OrgEvent::DivisionCreated {
                division_id: division.id,
                division_kind: kind,
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            None,
        );

        Ok(division)
    }

    /// Create a group inside a division.
    ///
    /// President or that division's head; group names are unique within
    /// their division.
    pub fn create_group(
        &self,
        division_id: DivisionId,
        name: &str,
        actor: &ActorContext,
    ) -> Result<Group, EngineError> {
        let snapshot = self.store.snapshot()?;
        let division = snapshot.division(division_id)?;
        access::ensure_president_or_division_head(actor, &division)?;

        if snapshot.group_by_name(division.id, name).is_some() {
            return Err(EngineError::Conflict(format!(
                "a group named {} already exists in division {}",
                name.trim(),
                division.name
            )));
        }

        let group = Group::create(division.id, name)?;
        let mut txn = OrgTransaction::new();
        let group = txn.create_group(group);
        self.store.commit(txn)?;

        self.audit.emit(
            OrgEvent::GroupCreated {
                group_id: group.id,
                division_id: division.id,
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            None,
        );

        Ok(group)
    }

    /// Delete a group that has no live membership.
    ///
    /// Soft-removed rows and rows of withdrawn members do not block the
    /// deletion; they stay behind as history.
    pub fn delete_group(&self, group_id: GroupId, actor: &ActorContext) -> Result<(), EngineError> {
        let snapshot = self.store.snapshot()?;
        let group = snapshot.group(group_id)?;
        let division = snapshot.division(group.division_id)?;
        access::ensure_president_or_division_head(actor, &division)?;

        if !snapshot.live_memberships_in_group(&group).is_empty() {
            return Err(EngineError::Conflict(format!(
                "group {} still has active members",
                group.name
            )));
        }

        let mut txn = OrgTransaction::new();
        txn.delete_group(&group);
        self.store.commit(txn)?;

        self.audit.emit(
            OrgEvent::GroupDeleted {
                group_id: group.id,
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            None,
        );

        Ok(())
    }

    /// Delete an empty division together with its groups. President-only.
    ///
    /// A division with any attached member is a conflict; withdraw them
    /// first. Groups cannot outlive their division, so they are deleted in
    /// the same transaction.
    pub fn delete_division(
        &self,
        division_id: DivisionId,
        actor: &ActorContext,
    ) -> Result<(), EngineError> {
        actor.ensure_president()?;

        let snapshot = self.store.snapshot()?;
        let division = snapshot.division(division_id)?;
        if !snapshot.members_in_division(division.id).is_empty() {
            return Err(EngineError::Conflict(format!(
                "division {} still has members",
                division.name
            )));
        }

        let mut txn = OrgTransaction::new();
        for group in snapshot.groups_in_division(division.id) {
            txn.delete_group(&group);
        }
        txn.delete_division(&division);
        self.store.commit(txn)?;

        tracing::info!(
            "division {} deleted with its groups by {}",
            division.id,
            actor.member_id
        );
        self.audit.emit(
            OrgEvent::DivisionDeleted {
                division_id: division.id,
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            None,
        );

        Ok(())
    }

    /// Toggle a member between `Active` and `Inactive` dormancy.
    ///
    /// President or the member's own division head; a divisionless member
    /// can only be toggled by the president. Banned and withdrawn members
    /// are out of scope: bans are lifted via [`AdminService::lift_ban`] and
    /// withdrawals reversed by re-attaching. Never touches `division_id`.
    pub fn set_member_standing(
        &self,
        member_id: MemberId,
        standing: Standing,
        actor: &ActorContext,
    ) -> Result<Member, EngineError> {
        let snapshot = self.store.snapshot()?;
        let mut member = snapshot.member(member_id)?;

        match member.division_id {
            Some(division_id) => {
                let division = snapshot.division(division_id)?;
                access::ensure_president_or_division_head(actor, &division)?;
            }
            None => actor.ensure_president()?,
        }

        if member.status.is_banned() {
            return Err(EngineError::Conflict(format!(
                "member {} is banned; lift the ban first",
                member.id
            )));
        }
        if member.status.is_withdrawn() {
            return Err(EngineError::Conflict(format!(
                "member {} is withdrawn; attach them to a division to reinstate",
                member.id
            )));
        }

        let next = match standing {
            Standing::Active => MemberStatus::Active,
            Standing::Inactive => MemberStatus::Inactive,
        };
        if member.status == next {
            return Ok(member);
        }

        member.status = next;
        let mut txn = OrgTransaction::new();
        let member = txn.update_member(member);
        self.store.commit(txn)?;

        self.emit_standing_change(&member, actor);
        Ok(member)
    }

    /// Ban a member, recording the reason. President-only.
    ///
    /// A banned member keeps their division attachment but loses any
    /// headship, fails head-eligibility and cannot be attached anywhere
    /// until the ban is lifted.
    pub fn ban_member(
        &self,
        member_id: MemberId,
        reason: &str,
        actor: &ActorContext,
    ) -> Result<Member, EngineError> {
        actor.ensure_president()?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EngineError::Validation("a ban reason is required".to_string()));
        }

        let snapshot = self.store.snapshot()?;
        let mut member = snapshot.member(member_id)?;
        if member.status.is_banned() {
            return Err(EngineError::Conflict(format!(
                "member {} is already banned",
                member.id
            )));
        }
        if snapshot.club().president_id == Some(member.id) {
            return Err(EngineError::Conflict(
                "the sitting president cannot be banned".to_string(),
            ));
        }

        let mut txn = OrgTransaction::new();
        if let Some(division_id) = member.division_id {
            let mut division = snapshot.division(division_id)?;
            if division.head_id == Some(member.id) {
                division.clear_head();
                txn.update_division(division);
                member.role = Role::Member;
            }
        }

        member.status = MemberStatus::Banned {
            reason: reason.to_string(),
        };
        let member = txn.update_member(member);
        self.store.commit(txn)?;

        tracing::info!("member {} banned by {}", member.id, actor.member_id);
        self.emit_standing_change(&member, actor);
        Ok(member)
    }

    /// Lift a ban, restoring the member to `Active`. President-only.
    pub fn lift_ban(&self, member_id: MemberId, actor: &ActorContext) -> Result<Member, EngineError> {
        actor.ensure_president()?;

        let snapshot = self.store.snapshot()?;
        let mut member = snapshot.member(member_id)?;
        if !member.status.is_banned() {
            return Err(EngineError::Conflict(format!(
                "member {} is not banned",
                member.id
            )));
        }

        member.status = MemberStatus::Active;
        let mut txn = OrgTransaction::new();
        let member = txn.update_member(member);
        self.store.commit(txn)?;

        self.emit_standing_change(&member, actor);
        Ok(member)
    }

    fn emit_standing_change(&self, member: &Member, actor: &ActorContext) {
        self.audit.emit(
            OrgEvent::StandingChanged {
                member_id: member.id,
                status: member.status.clone(),
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            Some(Notification {
                template: NotificationTemplate::StandingNotice,
                recipient: member.id,
                body: serde_json::json!({ "status": member.status.to_string() }),
            }),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
