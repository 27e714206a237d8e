//! Engine-level error taxonomy.

use thiserror::Error;

use clubhouse_core::DomainError;
use clubhouse_store::StoreError;

/// Failure of an engine operation.
///
/// The four business kinds (`Validation`, `Conflict`, `NotFound`,
/// `Forbidden`) are deterministic and caller-correctable; re-invoking the
/// operation unchanged yields the same answer. `Stale` is different: the
/// operation lost a race against a concurrent commit, and re-invoking it
/// against fresh state may well succeed. Callers that retry must only retry
/// `Stale`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A mandatory field was missing or a value failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An organizational invariant would be violated by the requested change.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced member/division/group/membership does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The caller lacks the required role or division scope.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Lost an optimistic concurrency race; safe to retry against fresh state.
    #[error("stale state: {0}")]
    Stale(String),

    /// The store rejected the commit for a non-transient reason.
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<DomainError> for EngineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => EngineError::Validation(msg),
            DomainError::Conflict(msg) => EngineError::Conflict(msg),
            DomainError::NotFound(what) => EngineError::NotFound(what),
            DomainError::Forbidden(msg) => EngineError::Forbidden(msg),
            DomainError::InvalidId(msg) => EngineError::Validation(msg),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Concurrency(msg) => EngineError::Stale(msg.clone()),
            StoreError::Duplicate(msg) => EngineError::Stale(msg.clone()),
            _ => EngineError::Store(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_matching_kinds() {
        assert!(matches!(
            EngineError::from(DomainError::conflict("taken")),
            EngineError::Conflict(_)
        ));
        assert!(matches!(
            EngineError::from(DomainError::invalid_id("bad uuid")),
            EngineError::Validation(_)
        ));
    }

    #[test]
    fn lost_races_surface_as_stale() {
        assert!(matches!(
            EngineError::from(StoreError::Concurrency("division version".into())),
            EngineError::Stale(_)
        ));
        assert!(matches!(
            EngineError::from(StoreError::Duplicate("membership pair".into())),
            EngineError::Stale(_)
        ));
        assert!(matches!(
            EngineError::from(StoreError::InvalidCommit("double write".into())),
            EngineError::Store(StoreError::InvalidCommit(_))
        ));
    }
}
