use std::sync::Arc;

use thiserror::Error;

use crate::snapshot::OrgSnapshot;
use crate::txn::OrgTransaction;

/// Store operation error.
///
/// These are **infrastructure errors** (storage, concurrency, uniqueness) as
/// opposed to domain errors (validation, invariants).
///
/// `Concurrency` and `Duplicate` are the transient outcomes of losing a race:
/// the caller may take a fresh snapshot and re-run the whole operation.
/// `InvalidCommit` means the batch itself was malformed and retrying will not
/// help.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("uniqueness violation: {0}")]
    Duplicate(String),

    #[error("invalid commit: {0}")]
    InvalidCommit(String),
}

/// Transactional store for the organizational collections.
///
/// The store holds four entity collections (members, divisions, groups,
/// group memberships) plus the singleton club record.
///
/// ## Read semantics
///
/// `snapshot()` returns a consistent point-in-time view of everything. All
/// validation runs against one snapshot; the entity versions captured in it
/// become the expectations of the following commit.
///
/// ## Commit semantics
///
/// `commit()` applies a version-guarded batch atomically:
/// - every write carries an [`clubhouse_core::ExpectedVersion`] captured at
///   snapshot time; the **whole batch** is validated before anything applies
/// - any failed expectation rejects the batch with `Concurrency`
/// - `(member, group)` membership uniqueness is enforced as an index
///   constraint; violating inserts reject the batch with `Duplicate`
/// - partial application is never observable
///
/// Implementations must be safe to share across threads; concurrent commits
/// against the same entity are serialized by the version check, not by the
/// caller.
pub trait OrgStore: Send + Sync {
    /// Consistent point-in-time view of all collections.
    fn snapshot(&self) -> Result<OrgSnapshot, StoreError>;

    /// Atomically apply a version-guarded batch (all-or-nothing).
    fn commit(&self, txn: OrgTransaction) -> Result<(), StoreError>;
}

impl<S> OrgStore for Arc<S>
where
    S: OrgStore + ?Sized,
{
    fn snapshot(&self) -> Result<OrgSnapshot, StoreError> {
        (**self).snapshot()
    }

    fn commit(&self, txn: OrgTransaction) -> Result<(), StoreError> {
        (**self).commit(txn)
    }
}
