//! Optimistic concurrency guard.

use serde::{Deserialize, Serialize};

/// Version expectation attached to a write.
///
/// `Exact(n)` asserts the stored record is still at version `n`; the commit
/// is rejected wholesale if any expectation in the batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedVersion {
    /// No expectation; the write applies regardless of the stored version.
    Any,
    /// The stored version must equal this value.
    Exact(u64),
}

impl ExpectedVersion {
    /// Whether `actual` satisfies this expectation.
    pub fn matches(&self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(expected) => *expected == actual,
        }
    }
}
