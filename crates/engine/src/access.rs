//! Division-scoped authorization checks.

use clubhouse_auth::ActorContext;
use clubhouse_org::Division;

use crate::error::EngineError;

/// Passes when the actor is the president or the stored head of `division`.
///
/// The head claim alone is never enough: which division a caller heads is
/// decided by the stored `head_id`, so a head of one division is an ordinary
/// outsider everywhere else.
pub(crate) fn ensure_president_or_division_head(
    actor: &ActorContext,
    division: &Division,
) -> Result<(), EngineError> {
    if actor.is_president() || division.head_id == Some(actor.member_id) {
        return Ok(());
    }
    Err(EngineError::Forbidden(format!(
        "requires the president or the head of division {}",
        division.name
    )))
}

#[cfg(test)]
mod tests {
    use clubhouse_core::MemberId;
    use clubhouse_org::DivisionKind;

    use super::*;

    #[test]
    fn stored_head_id_decides_division_scope() {
        let head_id = MemberId::new();
        let mut division = Division::create("Cyber", DivisionKind::Cyber).unwrap();
        division.assign_head(head_id);

        let head = ActorContext::division_head(head_id);
        let other_head = ActorContext::division_head(MemberId::new());
        let president = ActorContext::president(MemberId::new());

        assert!(ensure_president_or_division_head(&head, &division).is_ok());
        assert!(ensure_president_or_division_head(&president, &division).is_ok());
        assert!(matches!(
            ensure_president_or_division_head(&other_head, &division),
            Err(EngineError::Forbidden(_))
        ));
    }
}
