//! Transient user notifications.
//!
//! [`NotificationQueue`] holds at most one live [`Notification`]. Posting a
//! new one replaces the old one and restarts the expiry timer; the timer is a
//! spawned Tokio task, so posting must happen inside a Tokio runtime.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Default lifetime of a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        };
        f.write_str(label)
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

/// Single-slot, self-expiring notification holder.
///
/// Clones share the same slot.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<Slot>>,
    ttl: Duration,
}

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    /// Bumped on every post and dismiss; an expiry only applies to the
    /// post with the same sequence number.
    seq: u64,
    expiry: Option<JoinHandle<()>>,
}

impl NotificationQueue {
    /// Create a queue whose notifications live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slot::default())),
            ttl,
        }
    }

    /// Lifetime of each notification.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Show `text`, replacing whatever is shown, and schedule it to clear.
    pub fn post(&self, kind: NotificationKind, text: impl Into<String>) {
        let text = text.into();
        debug!(%kind, %text, "Posting notification");

        let mut slot = self.slot();
        slot.seq += 1;
        let seq = slot.seq;

        if let Some(previous) = slot.expiry.take() {
            previous.abort();
        }
        slot.current = Some(Notification { kind, text });

        let inner = Arc::clone(&self.inner);
        let ttl = self.ttl;
        slot.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut slot = inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.seq == seq {
                slot.current = None;
                slot.expiry = None;
            }
        }));
    }

    pub fn info(&self, text: impl Into<String>) {
        self.post(NotificationKind::Info, text);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.post(NotificationKind::Warning, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.post(NotificationKind::Error, text);
    }

    /// The live notification, if any.
    pub fn current(&self) -> Option<Notification> {
        self.slot().current.clone()
    }

    /// Clear immediately and cancel the pending expiry.
    pub fn dismiss(&self) {
        let mut slot = self.slot();
        slot.seq += 1;
        slot.current = None;
        if let Some(expiry) = slot.expiry.take() {
            expiry.abort();
        }
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("current", &self.current())
            .field("ttl", &self.ttl)
            .finish()
    }
}
