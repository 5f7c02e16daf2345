//! NotificationSink port - Best-effort delivery of lifecycle notifications.
//!
//! Notifications are sent after the state change they describe has
//! committed. A failed delivery is reported to the caller of `notify` (the
//! dispatcher), which logs it; it never affects the lifecycle outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, EventEnvelope};

/// A lifecycle event addressed to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// User, consultant or admin id the notification is for.
    pub recipient: String,
    pub event: EventEnvelope,
}

impl Notification {
    pub fn new(recipient: impl Into<String>, event: EventEnvelope) -> Self {
        Self {
            recipient: recipient.into(),
            event,
        }
    }

    /// Event kind, e.g. `booking.accepted.v1`.
    pub fn kind(&self) -> &str {
        &self.event.event_type
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn NotificationSink) {}

    #[test]
    fn kind_is_event_type() {
        let n = Notification::new(
            "user-1",
            EventEnvelope::new("booking.accepted.v1", "b-1", "Booking", json!({})),
        );
        assert_eq!(n.kind(), "booking.accepted.v1");
        assert_eq!(n.recipient, "user-1");
    }
}
