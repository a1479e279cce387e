//! In-memory user-facing notification queue.
//!
//! Notifications are ordered by arrival and auto-dismissed by a spawned
//! timer task once their timeout elapses; a timeout of zero disables
//! auto-dismissal. No deduplication, no priority ordering.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::state::{Events, StateEvent, emit};

/// Default auto-dismiss timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

/// One active notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Monotonic identifier, unique within the process.
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    /// Auto-dismiss delay in milliseconds; `0` keeps it until dismissed.
    pub timeout_ms: u64,
}

/// Ordered queue of active notifications.
#[derive(Clone)]
pub struct Notifications {
    items: Arc<RwLock<Vec<Notification>>>,
    next_id: Arc<AtomicU64>,
    events: Events,
}

impl Notifications {
    pub(crate) fn new(events: Events) -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    /// Append a notification, scheduling auto-dismissal when `timeout_ms > 0`.
    /// Returns the assigned id.
    pub async fn send(&self, message: impl Into<String>, kind: NotificationKind, timeout_ms: u64) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let notification = Notification { id, message: message.into(), kind, timeout_ms };
        self.items.write().await.push(notification);
        emit(&self.events, StateEvent::NotificationPushed(id));

        if timeout_ms > 0 {
            let queue = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
                queue.dismiss(id).await;
            });
        }
        id
    }

    /// Remove a notification by id. Unknown ids are ignored.
    pub async fn dismiss(&self, id: u64) {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|n| n.id != id);
        if items.len() != before {
            emit(&self.events, StateEvent::NotificationDismissed(id));
        }
    }

    /// Snapshot of the active notifications, in arrival order.
    pub async fn active(&self) -> Vec<Notification> {
        self.items.read().await.clone()
    }

    pub async fn success(&self, message: impl Into<String>) -> u64 {
        self.send(message, NotificationKind::Success, DEFAULT_TIMEOUT_MS).await
    }

    pub async fn error(&self, message: impl Into<String>) -> u64 {
        self.send(message, NotificationKind::Error, DEFAULT_TIMEOUT_MS).await
    }

    pub async fn info(&self, message: impl Into<String>) -> u64 {
        self.send(message, NotificationKind::Info, DEFAULT_TIMEOUT_MS).await
    }

    pub async fn warning(&self, message: impl Into<String>) -> u64 {
        self.send(message, NotificationKind::Warning, DEFAULT_TIMEOUT_MS).await
    }
}

#[cfg(test)]
#[path = "notifications_test.rs"]
mod tests;
