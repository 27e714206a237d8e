//! Best-effort outbound notification gateway.
//!
//! Delivery is fire-and-forget: a failed notification is logged by the
//! caller and swallowed, never propagated. Consumers of a channel-backed
//! notifier must tolerate duplicates.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use clubhouse_core::MemberId;

/// Closed registry of outbound notification templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    HeadAssigned,
    HeadRemoved,
    PresidentPromoted,
    DivisionWelcome,
    DivisionWithdrawal,
    GroupJoined,
    GroupRemoved,
    EmailVerification,
    StandingNotice,
}

impl NotificationTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationTemplate::HeadAssigned => "head_assigned",
            NotificationTemplate::HeadRemoved => "head_removed",
            NotificationTemplate::PresidentPromoted => "president_promoted",
            NotificationTemplate::DivisionWelcome => "division_welcome",
            NotificationTemplate::DivisionWithdrawal => "division_withdrawal",
            NotificationTemplate::GroupJoined => "group_joined",
            NotificationTemplate::GroupRemoved => "group_removed",
            NotificationTemplate::EmailVerification => "email_verification",
            NotificationTemplate::StandingNotice => "standing_notice",
        }
    }
}

impl core::fmt::Display for NotificationTemplate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound notification addressed to a single member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: NotificationTemplate,
    pub recipient: MemberId,
    /// Template data, rendered by the delivery layer.
    pub body: serde_json::Value,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification gateway unavailable: {0}")]
    Gateway(String),

    #[error("notifier lock poisoned")]
    Poisoned,
}

/// Outbound notification gateway.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Channel-backed notifier
// ─────────────────────────────────────────────────────────────────────────────

/// A subscription to the notification stream.
///
/// Single-threaded consumption; each subscription gets a copy of every
/// notification published after it subscribed.
#[derive(Debug)]
pub struct NotificationSubscription {
    receiver: Receiver<Notification>,
}

impl NotificationSubscription {
    pub fn new(receiver: Receiver<Notification>) -> Self {
        Self { receiver }
    }

    /// Block until the next notification is available.
    pub fn recv(&self) -> Result<Notification, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a notification without blocking.
    pub fn try_recv(&self) -> Result<Notification, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a notification.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Notification, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// In-memory fan-out notifier.
///
/// - No IO / no async
/// - Best-effort fan-out
/// - At-least-once acceptable (subscribers must be idempotent)
#[derive(Debug, Default)]
pub struct ChannelNotifier {
    subscribers: Mutex<Vec<mpsc::Sender<Notification>>>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> NotificationSubscription {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive notifications until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        NotificationSubscription::new(rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut subs = self.subscribers.lock().map_err(|_| NotifyError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(notification.clone()).is_ok());

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording notifier (test double)
// ─────────────────────────────────────────────────────────────────────────────

/// Notifier that remembers everything it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut sent = self.sent.lock().map_err(|_| NotifyError::Poisoned)?;
        sent.push(notification);
        Ok(())
    }
}
