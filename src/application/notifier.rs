//! Post-commit notification dispatch.
//!
//! Handlers call `Notifier::dispatch` after their unit of work committed.
//! Delivery runs on a spawned task; a failure is logged and never reaches
//! the caller of the lifecycle operation.

use std::sync::Arc;

use crate::domain::foundation::{Actor, LifecycleEvent};
use crate::ports::{Notification, NotificationSink};

#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Sends `event` to `recipient` in the background. Events without a
    /// recipient are dropped. `actor` is absent for system-initiated
    /// transitions.
    pub fn dispatch<E: LifecycleEvent>(
        &self,
        recipient: Option<String>,
        event: &E,
        actor: Option<&Actor>,
    ) {
        let Some(recipient) = recipient else {
            return;
        };
        let envelope = match event.to_envelope() {
            Ok(envelope) => match actor {
                Some(actor) => envelope.with_actor(actor.to_string()),
                None => envelope,
            },
            Err(e) => {
                tracing::warn!(
                    event_type = event.event_type(),
                    error = %e,
                    "Failed to serialize notification"
                );
                return;
            }
        };

        let sink = Arc::clone(&self.sink);
        let notification = Notification::new(recipient, envelope);
        tokio::spawn(async move {
            let kind = notification.kind().to_string();
            let recipient = notification.recipient.clone();
            if let Err(e) = sink.notify(notification).await {
                tracing::warn!(
                    kind = %kind,
                    recipient = %recipient,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        });
    }
}
