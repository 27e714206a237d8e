//! Append-only audit log contract and in-memory implementation.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::AuditEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit log unavailable: {0}")]
    Unavailable(String),

    #[error("audit log lock poisoned")]
    Poisoned,
}

/// A recorded audit entry: the event plus its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry<E> {
    /// 1-based position in the log; strictly increasing, never reused.
    pub sequence: u64,
    /// When the sink accepted the entry (storage time, not business time).
    pub recorded_at: DateTime<Utc>,
    pub event: E,
}

/// Durable append-only audit sink.
///
/// `record` must not fail for business reasons; an error here means the sink
/// itself is broken. Callers log such failures and continue; a lost audit
/// entry never rolls back the state change it describes.
pub trait AuditSink<E: AuditEvent>: Send + Sync {
    fn record(&self, event: &E) -> Result<(), AuditError>;
}

impl<E, S> AuditSink<E> for Arc<S>
where
    E: AuditEvent,
    S: AuditSink<E> + ?Sized,
{
    fn record(&self, event: &E) -> Result<(), AuditError> {
        (**self).record(event)
    }
}

/// In-memory audit log.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryAuditLog<E> {
    entries: RwLock<Vec<AuditEntry<E>>>,
}

impl<E> InMemoryAuditLog<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> Default for InMemoryAuditLog<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Clone> InMemoryAuditLog<E> {
    /// Snapshot of all entries in recorded order.
    pub fn entries(&self) -> Vec<AuditEntry<E>> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: AuditEvent> InMemoryAuditLog<E> {
    /// Entries whose event type matches `event_type`, in recorded order.
    pub fn entries_of_type(&self, event_type: &str) -> Vec<AuditEntry<E>> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.event.event_type() == event_type)
            .collect()
    }
}

impl<E: AuditEvent> AuditSink<E> for InMemoryAuditLog<E> {
    fn record(&self, event: &E) -> Result<(), AuditError> {
        let mut entries = self.entries.write().map_err(|_| AuditError::Poisoned)?;
        let sequence = entries.len() as u64 + 1;
        entries.push(AuditEntry {
            sequence,
            recorded_at: Utc::now(),
            event: event.clone(),
        });
        Ok(())
    }
}
