//! Role assignment: division headship and the presidency.

use std::sync::Arc;

use clubhouse_auth::ActorContext;
use clubhouse_audit::{Notification, NotificationTemplate};
use clubhouse_core::{DivisionId, MemberId};
use clubhouse_org::{Division, Member, OrgEvent, Role, validate};
use clubhouse_store::{OrgStore, OrgTransaction};

use crate::audit::AuditNotifier;
use crate::clock::Clock;
use crate::error::EngineError;

/// Post-images of a successful head assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadAssignment {
    pub division: Division,
    pub head: Member,
}

/// Post-images of a successful head removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRemoval {
    pub division: Division,
    pub previous_head: Member,
}

/// Assigns and revokes the president and division-head roles.
///
/// Every operation reads one snapshot, validates against it and commits a
/// version-guarded transaction, so two concurrent assignments on the same
/// division collide on the division row and exactly one wins. Audit and
/// notification run only after the commit.
pub struct RoleService<S> {
    store: S,
    audit: AuditNotifier,
    clock: Arc<dyn Clock>,
}

impl<S> RoleService<S> {
    pub fn new(store: S, audit: AuditNotifier, clock: Arc<dyn Clock>) -> Self {
        Self { store, audit, clock }
    }
}

impl<S> RoleService<S>
where
    S: OrgStore,
{
    /// Promote `member_id` to head of `division_id`.
    ///
    /// Heads are promoted from within: the member must already belong to the
    /// division, be active and have a verified email. A different sitting
    /// head is demoted back to `Member` in the same transaction and stays in
    /// the division. The head role is derived from the division's stored
    /// kind. President-only.
    pub fn assign_division_head(
        &self,
        division_id: DivisionId,
        member_id: MemberId,
        actor: &ActorContext,
    ) -> Result<HeadAssignment, EngineError> {
        actor.ensure_president()?;

        let snapshot = self.store.snapshot()?;
        let mut division = snapshot.division(division_id)?;
        let mut member = snapshot.member(member_id)?;

        validate::head_belongs_to_division(&member, &division)?;
        validate::head_is_eligible(&member)?;

        if division.head_id == Some(member.id) {
            // Already the head; nothing to change.
            return Ok(HeadAssignment { division, head: member });
        }

        let previous_head = division.head_id;
        let mut txn = OrgTransaction::new();
        if let Some(prior_id) = previous_head {
            let mut prior = snapshot.member(prior_id)?;
            // Only a head role is stripped; a prior head who has since
            // taken another role keeps it.
            if prior.role.is_division_head() {
                prior.role = Role::Member;
                txn.update_member(prior);
            }
        }

        member.role = division.head_role();
        division.assign_head(member.id);
        let head = txn.update_member(member);
        let division = txn.update_division(division);
        self.store.commit(txn)?;

        tracing::info!(
            "division {} head assigned to member {} by {}",
            division.id,
            head.id,
            actor.member_id
        );
        self.audit.emit(
            OrgEvent::HeadAssigned {
                division_id: division.id,
                member_id: head.id,
                previous_head,
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            Some(Notification {
                template: NotificationTemplate::HeadAssigned,
                recipient: head.id,
                body: serde_json::json!({
                    "division": division.name,
                    "role": head.role.to_string(),
                }),
            }),
        );

        Ok(HeadAssignment { division, head })
    }

    /// Clear the head of `division_id`, demoting them back to `Member`.
    ///
    /// The former head stays in the division as an ordinary member.
    /// President-only; a division without a head is a conflict.
    pub fn remove_division_head(
        &self,
        division_id: DivisionId,
        actor: &ActorContext,
    ) -> Result<HeadRemoval, EngineError> {
        actor.ensure_president()?;

        let snapshot = self.store.snapshot()?;
        let mut division = snapshot.division(division_id)?;
        let Some(head_id) = division.head_id else {
            return Err(EngineError::Conflict(format!(
                "division {} has no head assigned",
                division.name
            )));
        };

        let mut head = snapshot.member(head_id)?;
        if head.role.is_division_head() {
            head.role = Role::Member;
        }
        division.clear_head();

        let mut txn = OrgTransaction::new();
        let previous_head = txn.update_member(head);
        let division = txn.update_division(division);
        self.store.commit(txn)?;

        tracing::info!(
            "division {} head {} removed by {}",
            division.id,
            previous_head.id,
            actor.member_id
        );
        self.audit.emit(
            OrgEvent::HeadRemoved {
                division_id: division.id,
                member_id: previous_head.id,
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            Some(Notification {
                template: NotificationTemplate::HeadRemoved,
                recipient: previous_head.id,
                body: serde_json::json!({ "division": division.name }),
            }),
        );

        Ok(HeadRemoval { division, previous_head })
    }

    /// Promote `candidate_id` to president.
    ///
    /// The singleton invariant is checked against the club record and
    /// re-validated by the commit: the club row is written under its
    /// expected version, so concurrent promotions collide there and only
    /// one installs. Presidents are auto-verified. A candidate who heads a
    /// division gives up that seat on promotion. Re-promoting the sitting
    /// president is a no-op.
    pub fn promote_to_president(
        &self,
        candidate_id: MemberId,
        actor: &ActorContext,
    ) -> Result<Member, EngineError> {
        let snapshot = self.store.snapshot()?;
        let club = snapshot.club();
        let mut member = snapshot.member(candidate_id)?;

        validate::single_president(club.president_id, candidate_id)?;
        if club.president_id == Some(candidate_id) {
            return Ok(member);
        }
        if !member.is_active() {
            return Err(EngineError::Conflict(format!(
                "member {} is not active ({})",
                member.id, member.status
            )));
        }

        member.role = Role::President;
        member.email_verified = true;

        let mut txn = OrgTransaction::new();
        // A sitting head moves up; their division's head seat is vacated
        // in the same transaction.
        if let Some(division_id) = member.division_id {
            let mut division = snapshot.division(division_id)?;
            if division.head_id == Some(member.id) {
                division.clear_head();
                txn.update_division(division);
            }
        }
        let member = txn.update_member(member);
        let mut club = club;
        club.install_president(member.id);
        txn.put_club(club);
        self.store.commit(txn)?;

        tracing::info!("member {} promoted to president", member.id);
        self.audit.emit(
            OrgEvent::PresidentPromoted {
                member_id: member.id,
                actor: actor.member_id,
                occurred_at: self.clock.now(),
            },
            Some(Notification {
                template: NotificationTemplate::PresidentPromoted,
                recipient: member.id,
                body: serde_json::json!({ "name": member.name }),
            }),
        );

        Ok(member)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use clubhouse_audit::{InMemoryAuditLog, RecordingNotifier};
    use clubhouse_org::{DivisionKind, MemberStatus};
    use clubhouse_store::InMemoryOrgStore;

    use super::*;
    use crate::clock::SystemClock;

    fn service() -> (
        RoleService<Arc<InMemoryOrgStore>>,
        Arc<InMemoryOrgStore>,
        Arc<InMemoryAuditLog<OrgEvent>>,
    ) {
        let store = Arc::new(InMemoryOrgStore::new());
        let log = Arc::new(InMemoryAuditLog::new());
        let audit = AuditNotifier::new(log.clone(), Arc::new(RecordingNotifier::new()));
        let service = RoleService::new(store.clone(), audit, Arc::new(SystemClock));
        (service, store, log)
    }

    fn seed_division(store: &InMemoryOrgStore, name: &str, kind: DivisionKind) -> Division {
        let mut txn = OrgTransaction::new();
        let division = txn.create_division(Division::create(name, kind).unwrap());
        store.commit(txn).unwrap();
        division
    }

    fn seed_member(store: &InMemoryOrgStore, name: &str, email: &str) -> Member {
        let mut txn = OrgTransaction::new();
        let member = txn.create_member(Member::register(name, email).unwrap());
        store.commit(txn).unwrap();
        member
    }

    fn seed_member_in(
        store: &InMemoryOrgStore,
        division: &Division,
        name: &str,
        email: &str,
    ) -> Member {
        let mut member = Member::register(name, email).unwrap();
        member.division_id = Some(division.id);
        member.email_verified = true;
        let mut txn = OrgTransaction::new();
        let member = txn.create_member(member);
        store.commit(txn).unwrap();
        member
    }

    #[test]
    fn promote_installs_exactly_one_president() {
        let (service, store, log) = service();
        let alice = seed_member(&store, "Alice", "alice@club.test");
        let bob = seed_member(&store, "Bob", "bob@club.test");
        let actor = ActorContext::member(alice.id);

        let president = service.promote_to_president(alice.id, &actor).unwrap();
        assert_eq!(president.role, Role::President);
        assert!(president.email_verified);

        let err = service.promote_to_president(bob.id, &actor).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        // Re-promoting the sitting president changes nothing and stays quiet.
        service.promote_to_president(alice.id, &actor).unwrap();
        assert_eq!(log.entries_of_type("org.club.president_promoted").len(), 1);

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.club().president_id, Some(alice.id));
    }

    #[test]
    fn promote_requires_an_active_candidate() {
        let (service, store, _) = service();
        let mut dormant = Member::register("Dana", "dana@club.test").unwrap();
        dormant.status = MemberStatus::Inactive;
        let mut txn = OrgTransaction::new();
        let dormant = txn.create_member(dormant);
        store.commit(txn).unwrap();

        let err = service
            .promote_to_president(dormant.id, &ActorContext::member(dormant.id))
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn assign_head_promotes_from_within() {
        let (service, store, log) = service();
        let division = seed_division(&store, "Cyber", DivisionKind::Cyber);
        let member = seed_member_in(&store, &division, "Noor", "noor@club.test");
        let president = ActorContext::president(MemberId::new());

        let assignment = service
            .assign_division_head(division.id, member.id, &president)
            .unwrap();

        assert_eq!(assignment.division.head_id, Some(member.id));
        assert_eq!(assignment.head.role, Role::DivisionHead(DivisionKind::Cyber));
        assert_eq!(log.entries_of_type("org.division.head_assigned").len(), 1);
    }

    #[test]
    fn assign_head_demotes_the_previous_head_in_place() {
        let (service, store, _) = service();
        let division = seed_division(&store, "Dev", DivisionKind::Dev);
        let first = seed_member_in(&store, &division, "Omar", "omar@club.test");
        let second = seed_member_in(&store, &division, "Lena", "lena@club.test");
        let president = ActorContext::president(MemberId::new());

        service
            .assign_division_head(division.id, first.id, &president)
            .unwrap();
        let assignment = service
            .assign_division_head(division.id, second.id, &president)
            .unwrap();

        assert_eq!(assignment.division.head_id, Some(second.id));

        let snapshot = store.snapshot().unwrap();
        let demoted = snapshot.member(first.id).unwrap();
        assert_eq!(demoted.role, Role::Member);
        // The demoted head stays an ordinary member of the division.
        assert_eq!(demoted.division_id, Some(division.id));
    }

    #[test]
    fn assign_head_rejects_outsiders_and_unverified_members() {
        let (service, store, _) = service();
        let cyber = seed_division(&store, "Cyber", DivisionKind::Cyber);
        let media = seed_division(&store, "Media", DivisionKind::Media);
        let outsider = seed_member_in(&store, &media, "Rina", "rina@club.test");
        let mut unverified = Member::register("Tariq", "tariq@club.test").unwrap();
        unverified.division_id = Some(cyber.id);
        let mut txn = OrgTransaction::new();
        let unverified = txn.create_member(unverified);
        store.commit(txn).unwrap();
        let president = ActorContext::president(MemberId::new());

        let err = service
            .assign_division_head(cyber.id, outsider.id, &president)
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        let err = service
            .assign_division_head(cyber.id, unverified.id, &president)
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn head_assignment_is_president_only() {
        let (service, store, _) = service();
        let division = seed_division(&store, "Design", DivisionKind::Design);
        let member = seed_member_in(&store, &division, "Yara", "yara@club.test");

        let err = service
            .assign_division_head(division.id, member.id, &ActorContext::division_head(member.id))
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
    }

    #[test]
    fn promoting_a_sitting_head_vacates_the_seat_and_survives_replacement() {
        let (service, store, _) = service();
        let division = seed_division(&store, "Cyber", DivisionKind::Cyber);
        let head = seed_member_in(&store, &division, "Noor", "noor@club.test");
        let successor = seed_member_in(&store, &division, "Lena", "lena@club.test");
        let actor = ActorContext::president(MemberId::new());

        service
            .assign_division_head(division.id, head.id, &actor)
            .unwrap();
        let promoted = service
            .promote_to_president(head.id, &ActorContext::member(head.id))
            .unwrap();
        assert_eq!(promoted.role, Role::President);

        // The head seat was vacated in the same transaction.
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.division(division.id).unwrap().head_id, None);

        // Filling the seat again leaves the presidency untouched.
        service
            .assign_division_head(division.id, successor.id, &actor)
            .unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.member(head.id).unwrap().role, Role::President);
        assert_eq!(snapshot.club().president_id, Some(head.id));
    }

    #[test]
    fn clearing_a_seat_never_demotes_a_non_head_role() {
        let (service, store, _) = service();
        let division = seed_division(&store, "Dev", DivisionKind::Dev);
        let member = seed_member_in(&store, &division, "Sami", "sami@club.test");
        let actor = ActorContext::president(MemberId::new());

        // Seed a seat held by a member whose role is not a head role.
        let snapshot = store.snapshot().unwrap();
        let mut seated = snapshot.member(member.id).unwrap();
        seated.role = Role::President;
        let mut stored = snapshot.division(division.id).unwrap();
        stored.assign_head(member.id);
        let mut txn = OrgTransaction::new();
        txn.update_member(seated);
        txn.update_division(stored);
        store.commit(txn).unwrap();

        let removal = service.remove_division_head(division.id, &actor).unwrap();

        assert_eq!(removal.division.head_id, None);
        assert_eq!(removal.previous_head.role, Role::President);
    }

    #[test]
    fn remove_head_clears_reference_and_demotes() {
        let (service, store, _) = service();
        let division = seed_division(&store, "Media", DivisionKind::Media);
        let member = seed_member_in(&store, &division, "Zain", "zain@club.test");
        let president = ActorContext::president(MemberId::new());

        service
            .assign_division_head(division.id, member.id, &president)
            .unwrap();
        let removal = service
            .remove_division_head(division.id, &president)
            .unwrap();

        assert_eq!(removal.division.head_id, None);
        assert_eq!(removal.previous_head.role, Role::Member);
        assert_eq!(removal.previous_head.division_id, Some(division.id));

        let err = service
            .remove_division_head(division.id, &president)
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }
}
