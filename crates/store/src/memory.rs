//! In-memory transactional store.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use clubhouse_core::{DivisionId, ExpectedVersion, GroupId, MemberId, MembershipId};
use clubhouse_org::{Club, Division, Group, GroupMembership, Member};

use crate::snapshot::OrgSnapshot;
use crate::store::{OrgStore, StoreError};
use crate::txn::{OrgTransaction, Write};

#[derive(Debug, Default)]
struct State {
    club: Club,
    members: HashMap<MemberId, Member>,
    divisions: HashMap<DivisionId, Division>,
    groups: HashMap<GroupId, Group>,
    memberships: HashMap<MembershipId, GroupMembership>,
    /// Unique index closing the concurrent-insert race on a pair.
    membership_pairs: HashMap<(MemberId, GroupId), MembershipId>,
}

/// Key of the entity a write targets, for duplicate-target detection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum TargetKey {
    Club,
    Member(MemberId),
    Division(DivisionId),
    Group(GroupId),
    Membership(MembershipId),
}

fn target_key(write: &Write) -> TargetKey {
    match write {
        Write::PutClub { .. } => TargetKey::Club,
        Write::CreateMember { member } => TargetKey::Member(member.id),
        Write::UpdateMember { member, .. } => TargetKey::Member(member.id),
        Write::DeleteMember { member_id, .. } => TargetKey::Member(*member_id),
        Write::CreateDivision { division } => TargetKey::Division(division.id),
        Write::UpdateDivision { division, .. } => TargetKey::Division(division.id),
        Write::DeleteDivision { division_id, .. } => TargetKey::Division(*division_id),
        Write::CreateGroup { group } => TargetKey::Group(group.id),
        Write::DeleteGroup { group_id, .. } => TargetKey::Group(*group_id),
        Write::CreateMembership { membership } => TargetKey::Membership(membership.id),
        Write::UpdateMembership { membership, .. } => TargetKey::Membership(membership.id),
    }
}

/// In-memory [`OrgStore`].
///
/// Intended for tests/dev. Not optimized for performance. The club record is
/// seeded (empty, version 0) at construction, so the presidency reference
/// always exists to be compare-and-swapped.
#[derive(Debug, Default)]
pub struct InMemoryOrgStore {
    state: RwLock<State>,
}

impl InMemoryOrgStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(expected: ExpectedVersion, current: u64, what: &str) -> Result<(), StoreError> {
        if expected.matches(current) {
            Ok(())
        } else {
            Err(StoreError::Concurrency(format!(
                "{what}: expected {expected:?}, found {current}"
            )))
        }
    }

    fn check_fresh(version: u64, what: &str) -> Result<(), StoreError> {
        if version == 1 {
            Ok(())
        } else {
            Err(StoreError::InvalidCommit(format!(
                "{what} create must commit at version 1"
            )))
        }
    }

    /// Validate the whole batch against current state before anything applies.
    fn validate(state: &State, writes: &[Write]) -> Result<(), StoreError> {
        let mut touched: HashSet<TargetKey> = HashSet::new();
        let mut new_pairs: HashSet<(MemberId, GroupId)> = HashSet::new();

        for write in writes {
            if !touched.insert(target_key(write)) {
                return Err(StoreError::InvalidCommit(
                    "batch writes the same entity twice".to_string(),
                ));
            }

            match write {
                Write::PutClub { expected, .. } => {
                    Self::check(*expected, state.club.version, "club")?;
                }
                Write::CreateMember { member } => {
                    Self::check_fresh(member.version, "member")?;
                    if state.members.contains_key(&member.id) {
                        return Err(StoreError::Duplicate(format!(
                            "member {} already exists",
                            member.id
                        )));
                    }
                }
                Write::UpdateMember { member, expected } => {
                    let current = state.members.get(&member.id).ok_or_else(|| {
                        StoreError::Concurrency(format!("member {} no longer exists", member.id))
                    })?;
                    Self::check(*expected, current.version, "member")?;
                }
                Write::DeleteMember {
                    member_id,
                    expected,
                } => {
                    let current = state.members.get(member_id).ok_or_else(|| {
                        StoreError::Concurrency(format!("member {member_id} no longer exists"))
                    })?;
                    Self::check(*expected, current.version, "member")?;
                }
                Write::CreateDivision { division } => {
                    Self::check_fresh(division.version, "division")?;
                    if state.divisions.contains_key(&division.id) {
                        return Err(StoreError::Duplicate(format!(
                            "division {} already exists",
                            division.id
                        )));
                    }
                }
                Write::UpdateDivision { division, expected } => {
                    let current = state.divisions.get(&division.id).ok_or_else(|| {
                        StoreError::Concurrency(format!(
                            "division {} no longer exists",
                            division.id
                        ))
                    })?;
                    Self::check(*expected, current.version, "division")?;
                }
                Write::DeleteDivision {
                    division_id,
                    expected,
                } => {
                    let current = state.divisions.get(division_id).ok_or_else(|| {
                        StoreError::Concurrency(format!("division {division_id} no longer exists"))
                    })?;
                    Self::check(*expected, current.version, "division")?;
                }
                Write::CreateGroup { group } => {
                    Self::check_fresh(group.version, "group")?;
                    if state.groups.contains_key(&group.id) {
                        return Err(StoreError::Duplicate(format!(
                            "group {} already exists",
                            group.id
                        )));
                    }
                }
                Write::DeleteGroup { group_id, expected } => {
                    let current = state.groups.get(group_id).ok_or_else(|| {
                        StoreError::Concurrency(format!("group {group_id} no longer exists"))
                    })?;
                    Self::check(*expected, current.version, "group")?;
                }
                Write::CreateMembership { membership } => {
                    Self::check_fresh(membership.version, "membership")?;
                    if state.memberships.contains_key(&membership.id) {
                        return Err(StoreError::Duplicate(format!(
                            "membership {} already exists",
                            membership.id
                        )));
                    }
                    let pair = (membership.member_id, membership.group_id);
                    if state.membership_pairs.contains_key(&pair) || !new_pairs.insert(pair) {
                        return Err(StoreError::Duplicate(format!(
                            "membership for member {} in group {} already exists",
                            membership.member_id, membership.group_id
                        )));
                    }
                }
                Write::UpdateMembership {
                    membership,
                    expected,
                } => {
                    let current = state.memberships.get(&membership.id).ok_or_else(|| {
                        StoreError::Concurrency(format!(
                            "membership {} no longer exists",
                            membership.id
                        ))
                    })?;
                    Self::check(*expected, current.version, "membership")?;
                }
            }
        }

        Ok(())
    }

    fn apply(state: &mut State, writes: Vec<Write>) {
        for write in writes {
            match write {
                Write::PutClub { club, .. } => state.club = club,
                Write::CreateMember { member } | Write::UpdateMember { member, .. } => {
                    state.members.insert(member.id, member);
                }
                Write::DeleteMember { member_id, .. } => {
                    state.members.remove(&member_id);
                }
                Write::CreateDivision { division } | Write::UpdateDivision { division, .. } => {
                    state.divisions.insert(division.id, division);
                }
                Write::DeleteDivision { division_id, .. } => {
                    state.divisions.remove(&division_id);
                }
                Write::CreateGroup { group } => {
                    state.groups.insert(group.id, group);
                }
                Write::DeleteGroup { group_id, .. } => {
                    state.groups.remove(&group_id);
                }
                Write::CreateMembership { membership } => {
                    state
                        .membership_pairs
                        .insert((membership.member_id, membership.group_id), membership.id);
                    state.memberships.insert(membership.id, membership);
                }
                Write::UpdateMembership { membership, .. } => {
                    state.memberships.insert(membership.id, membership);
                }
            }
        }
    }
}

impl OrgStore for InMemoryOrgStore {
    fn snapshot(&self) -> Result<OrgSnapshot, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::InvalidCommit("lock poisoned".to_string()))?;

        Ok(OrgSnapshot::new(
            state.club.clone(),
            state.members.values().cloned().collect(),
            state.divisions.values().cloned().collect(),
            state.groups.values().cloned().collect(),
            state.memberships.values().cloned().collect(),
        ))
    }

    fn commit(&self, txn: OrgTransaction) -> Result<(), StoreError> {
        let writes = txn.into_writes();
        if writes.is_empty() {
            return Ok(());
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::InvalidCommit("lock poisoned".to_string()))?;

        Self::validate(&state, &writes)?;
        Self::apply(&mut state, writes);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
