//! Pure organizational invariant checks.
//!
//! Side-effect free; composed by the engine services before every mutating
//! commit and always evaluated against the same snapshot that feeds the
//! transaction.

use clubhouse_core::{DivisionId, DomainError, DomainResult, MemberId};

use crate::division::Division;
use crate::group::Group;
use crate::member::Member;

/// At most one president exists club-wide.
///
/// Passes when no president is installed or the candidate already holds the
/// presidency.
pub fn single_president(current: Option<MemberId>, candidate: MemberId) -> DomainResult<()> {
    match current {
        Some(existing) if existing != candidate => {
            Err(DomainError::conflict("a president is already installed"))
        }
        _ => Ok(()),
    }
}

/// A head must already belong to the division it is to lead.
pub fn head_belongs_to_division(member: &Member, division: &Division) -> DomainResult<()> {
    if member.division_id != Some(division.id) {
        return Err(DomainError::conflict(format!(
            "member {} does not belong to division {}",
            member.id, division.name
        )));
    }
    Ok(())
}

/// Heads must be active members with a verified email.
pub fn head_is_eligible(member: &Member) -> DomainResult<()> {
    if !member.status.is_active() {
        return Err(DomainError::conflict(format!(
            "member {} is not active ({})",
            member.id, member.status
        )));
    }
    if !member.email_verified {
        return Err(DomainError::conflict(format!(
            "member {} has not verified their email",
            member.id
        )));
    }
    Ok(())
}

/// A group operation must target a group of the stated division.
pub fn group_belongs_to_division(group: &Group, division_id: DivisionId) -> DomainResult<()> {
    if group.division_id != division_id {
        return Err(DomainError::conflict(format!(
            "group {} belongs to a different division",
            group.name
        )));
    }
    Ok(())
}

/// Group membership requires membership of the group's division.
pub fn member_eligible_for_group(member: &Member, group: &Group) -> DomainResult<()> {
    if member.division_id != Some(group.division_id) {
        return Err(DomainError::conflict(format!(
            "member {} does not belong to the division of group {}",
            member.id, group.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::DivisionKind;

    fn member_in(division_id: DivisionId) -> Member {
        let mut member = Member::register("Alice", "alice@example.com").unwrap();
        member.division_id = Some(division_id);
        member
    }

    #[test]
    fn single_president_allows_first_and_same_candidate() {
        let candidate = MemberId::new();
        assert!(single_president(None, candidate).is_ok());
        assert!(single_president(Some(candidate), candidate).is_ok());
    }

    #[test]
    fn single_president_rejects_second_candidate() {
        let err = single_president(Some(MemberId::new()), MemberId::new()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn head_must_belong_to_division() {
        let division = Division::create("Cyber", DivisionKind::Cyber).unwrap();
        let insider = member_in(division.id);
        let outsider = member_in(DivisionId::new());

        assert!(head_belongs_to_division(&insider, &division).is_ok());
        assert!(head_belongs_to_division(&outsider, &division).is_err());
    }

    #[test]
    fn head_eligibility_requires_active_and_verified() {
        let division_id = DivisionId::new();
        let mut member = member_in(division_id);

        assert!(head_is_eligible(&member).is_err());

        member.email_verified = true;
        assert!(head_is_eligible(&member).is_ok());

        member.status = crate::member::MemberStatus::Inactive;
        assert!(head_is_eligible(&member).is_err());
    }

    #[test]
    fn group_must_belong_to_stated_division() {
        let division_id = DivisionId::new();
        let group = Group::create(division_id, "Blue Team").unwrap();

        assert!(group_belongs_to_division(&group, division_id).is_ok());
        assert!(group_belongs_to_division(&group, DivisionId::new()).is_err());
    }

    #[test]
    fn group_membership_requires_division_membership() {
        let division_id = DivisionId::new();
        let group = Group::create(division_id, "Blue Team").unwrap();
        let insider = member_in(division_id);
        let outsider = member_in(DivisionId::new());

        assert!(member_eligible_for_group(&insider, &group).is_ok());
        assert!(member_eligible_for_group(&outsider, &group).is_err());
    }
}
