//! Notification sink that writes to the tracing log.
//!
//! Used when no webhook is configured.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{Notification, NotificationSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotificationSink;

impl LoggingNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LoggingNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError> {
        tracing::info!(
            kind = notification.kind(),
            recipient = %notification.recipient,
            aggregate_id = %notification.event.aggregate_id,
            "Notification"
        );
        Ok(())
    }
}
