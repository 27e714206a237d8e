//! Divisions and the closed division-kind registry.

use serde::{Deserialize, Serialize};

use clubhouse_core::{DivisionId, DomainError, DomainResult, Entity, MemberId};

use crate::member::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Division Kind
// ─────────────────────────────────────────────────────────────────────────────

/// Closed set of division kinds.
///
/// The kind is resolved once at division creation and stored; the head role
/// is always derived from it. An unrecognized kind label is a configuration
/// error: parsing fails, nothing falls back to an ordinary member role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionKind {
    Cyber,
    Dev,
    Design,
    Media,
}

impl DivisionKind {
    pub const ALL: [DivisionKind; 4] = [
        DivisionKind::Cyber,
        DivisionKind::Dev,
        DivisionKind::Design,
        DivisionKind::Media,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DivisionKind::Cyber => "cyber",
            DivisionKind::Dev => "dev",
            DivisionKind::Design => "design",
            DivisionKind::Media => "media",
        }
    }

    /// The role held by the head of a division of this kind.
    pub fn head_role(&self) -> Role {
        Role::DivisionHead(*self)
    }
}

impl core::fmt::Display for DivisionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for DivisionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cyber" => Ok(DivisionKind::Cyber),
            "dev" => Ok(DivisionKind::Dev),
            "design" => Ok(DivisionKind::Design),
            "media" => Ok(DivisionKind::Media),
            other => Err(DomainError::conflict(format!(
                "unrecognized division kind: {other}"
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Division
// ─────────────────────────────────────────────────────────────────────────────

/// An organizational division.
///
/// # Invariants
/// - If `head_id` is set, the referenced member is Active, email-verified and
///   has `division_id` equal to this division.
/// - At most one division references a given member as head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
    pub kind: DivisionKind,
    /// Weak reference to the current head; lookup only, not ownership.
    pub head_id: Option<MemberId>,
    pub version: u64,
}

impl Division {
    pub fn create(name: &str, kind: DivisionKind) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("division name cannot be empty"));
        }

        Ok(Self {
            id: DivisionId::new(),
            name: name.trim().to_string(),
            kind,
            head_id: None,
            version: 0,
        })
    }

    pub fn assign_head(&mut self, member_id: MemberId) {
        self.head_id = Some(member_id);
    }

    pub fn clear_head(&mut self) {
        self.head_id = None;
    }

    /// The role the head of this division holds, derived from the stored kind.
    pub fn head_role(&self) -> Role {
        self.kind.head_role()
    }
}

impl Entity for Division {
    type Id = DivisionId;

    fn id(&self) -> &DivisionId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
