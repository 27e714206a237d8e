//! Post-commit side effects: audit recording and outbound notification.

use std::sync::Arc;

use clubhouse_audit::{AuditEvent, AuditSink, Notification, Notifier};
use clubhouse_org::OrgEvent;

/// Fan-out for the side effects of a committed state change.
///
/// Both channels are best-effort from the caller's point of view: by the
/// time `emit` runs, the organizational change has already committed, so a
/// failing sink or gateway is logged at `warn` and swallowed rather than
/// surfaced as an operation failure.
#[derive(Clone)]
pub struct AuditNotifier {
    sink: Arc<dyn AuditSink<OrgEvent>>,
    notifier: Arc<dyn Notifier>,
}

impl AuditNotifier {
    pub fn new(sink: Arc<dyn AuditSink<OrgEvent>>, notifier: Arc<dyn Notifier>) -> Self {
        Self { sink, notifier }
    }

    /// Record `event` and deliver `notification` when one is addressed.
    pub fn emit(&self, event: OrgEvent, notification: Option<Notification>) {
        if let Err(err) = self.sink.record(&event) {
            tracing::warn!("audit record failed for {}: {err}", event.event_type());
        }

        if let Some(notification) = notification {
            let template = notification.template;
            if let Err(err) = self.notifier.notify(notification) {
                tracing::warn!("notification {template} failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use clubhouse_audit::{
        AuditError, InMemoryAuditLog, NotificationTemplate, NotifyError, RecordingNotifier,
    };
    use clubhouse_core::MemberId;

    use super::*;

    struct FailingSink;

    impl AuditSink<OrgEvent> for FailingSink {
        fn record(&self, _event: &OrgEvent) -> Result<(), AuditError> {
            Err(AuditError::Unavailable("disk full".to_string()))
        }
    }

    struct FailingNotifier {
        attempts: Mutex<usize>,
    }

    impl Notifier for FailingNotifier {
        fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            Err(NotifyError::Gateway("smtp timeout".to_string()))
        }
    }

    fn verified_event() -> OrgEvent {
        OrgEvent::EmailVerified {
            member_id: MemberId::new(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn emit_records_event_and_sends_notification() {
        let log: Arc<InMemoryAuditLog<OrgEvent>> = Arc::new(InMemoryAuditLog::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let audit = AuditNotifier::new(log.clone(), notifier.clone());
        let recipient = MemberId::new();

        audit.emit(
            verified_event(),
            Some(Notification {
                template: NotificationTemplate::EmailVerification,
                recipient,
                body: serde_json::json!({}),
            }),
        );

        assert_eq!(log.len(), 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, recipient);
    }

    #[test]
    fn failing_side_channels_are_swallowed() {
        let failing_notifier = Arc::new(FailingNotifier {
            attempts: Mutex::new(0),
        });
        let audit = AuditNotifier::new(Arc::new(FailingSink), failing_notifier.clone());

        audit.emit(
            verified_event(),
            Some(Notification {
                template: NotificationTemplate::EmailVerification,
                recipient: MemberId::new(),
                body: serde_json::json!({}),
            }),
        );

        // Both channels failed; emit neither panicked nor propagated.
        assert_eq!(*failing_notifier.attempts.lock().unwrap(), 1);
    }
}
