//! In-memory notification sink for tests.
//!
//! Records every notification it receives. It can be switched into a
//! failing mode to check that delivery errors never change an outcome.
//!
//! Uses `.expect()` on its lock; test use only.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Notification, NotificationSink};

#[derive(Default)]
pub struct InMemoryNotificationSink {
    received: RwLock<Vec<Notification>>,
    failing: AtomicBool,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Makes every later `notify` call fail after recording.
    pub fn fail_deliveries(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .read()
            .expect("InMemoryNotificationSink: lock poisoned")
            .clone()
    }

    /// Notifications of one kind, e.g. `booking.accepted.v1`.
    pub fn of_kind(&self, kind: &str) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.kind() == kind)
            .collect()
    }

    /// Yields to the runtime until `expected` notifications arrived or a
    /// bounded number of polls passed, then returns what was received.
    ///
    /// Dispatch happens on spawned tasks, so tests call this before
    /// asserting.
    pub async fn settle(&self, expected: usize) -> Vec<Notification> {
        for _ in 0..200 {
            if self.notifications().len() >= expected {
                break;
            }
            tokio::task::yield_now().await;
        }
        self.notifications()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError> {
        self.received
            .write()
            .expect("InMemoryNotificationSink: lock poisoned")
            .push(notification);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::NotificationError,
                "delivery failed (injected)",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::EventEnvelope;

    fn notification(kind: &str) -> Notification {
        Notification::new(
            "user-1",
            EventEnvelope::new(kind, "agg", "Booking", serde_json::json!({})),
        )
    }

    #[tokio::test]
    async fn records_notifications_by_kind() {
        let sink = InMemoryNotificationSink::new();
        sink.notify(notification("booking.accepted.v1")).await.unwrap();
        sink.notify(notification("booking.declined.v1")).await.unwrap();

        assert_eq!(sink.notifications().len(), 2);
        assert_eq!(sink.of_kind("booking.accepted.v1").len(), 1);
    }

    #[tokio::test]
    async fn failing_mode_still_records() {
        let sink = InMemoryNotificationSink::new();
        sink.fail_deliveries(true);
        let err = sink.notify(notification("x.v1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotificationError);
        assert_eq!(sink.notifications().len(), 1);
    }
}
