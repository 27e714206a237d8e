//! `clubhouse-audit` — audit trail and outbound notification machinery.
//!
//! Both collaborators are invoked after a successful commit and neither may
//! fail the caller: the audit sink is durable append-only, the notifier is
//! best-effort fan-out.

pub mod event;
pub mod notify;
pub mod sink;

pub use event::AuditEvent;
pub use notify::{
    ChannelNotifier, Notification, NotificationSubscription, NotificationTemplate, NotifyError,
    Notifier, RecordingNotifier,
};
pub use sink::{AuditEntry, AuditError, AuditSink, InMemoryAuditLog};
