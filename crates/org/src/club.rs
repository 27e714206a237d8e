//! The singleton club registry record.

use serde::{Deserialize, Serialize};

use clubhouse_core::MemberId;

/// Club-wide registry; the durable owner of the presidency reference.
///
/// Exactly one record exists. Writing it under an expected version is what
/// serializes concurrent presidency promotions: the singleton check is
/// re-validated against this record inside the transaction, not just at a
/// pre-check read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub president_id: Option<MemberId>,
    pub version: u64,
}

impl Club {
    pub fn new() -> Self {
        Self {
            president_id: None,
            version: 0,
        }
    }

    pub fn install_president(&mut self, member_id: MemberId) {
        self.president_id = Some(member_id);
    }
}

impl Default for Club {
    fn default() -> Self {
        Self::new()
    }
}
