//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, caller-correctable failures. All four
/// business kinds (validation, conflict, not-found, forbidden) are returned
/// synchronously and are never retried inside the engine; transient storage
/// conflicts are a separate concern surfaced by the store layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
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

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
