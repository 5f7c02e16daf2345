//! CompleteBookingHandler - Command handler for marking a session held.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::booking::{Booking, BookingError, BookingEvent};
use crate::domain::foundation::{today, Actor, BookingId};
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct CompleteBookingCommand {
    pub booking_id: BookingId,
    pub actor: Actor,
}

#[derive(Debug, Clone)]
pub struct CompleteBookingResult {
    pub booking: Booking,
    pub event: BookingEvent,
}

/// Handler for completing bookings.
///
/// Only the assigned consultant may complete, and not before the session
/// date (UTC).
pub struct CompleteBookingHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl CompleteBookingHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(
        &self,
        cmd: CompleteBookingCommand,
    ) -> Result<CompleteBookingResult, BookingError> {
        let booking_id = cmd.booking_id;
        let consultant = cmd
            .actor
            .as_consultant()
            .ok_or_else(|| BookingError::unauthorized(Some(booking_id), "complete", &cmd.actor))?;

        let current = self
            .store
            .find_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;
        if let Err(err) = current.check_completable(consultant, today()) {
            tracing::warn!(
                operation = "complete_booking",
                booking_id = %booking_id,
                actor = %cmd.actor,
                error = %err,
                "Completion rejected"
            );
            return Err(err);
        }

        let Some(booking) = self.store.complete_booking(booking_id, consultant).await? else {
            // Changed between the check and the write (e.g. cancelled).
            let status = self
                .store
                .find_booking(booking_id)
                .await?
                .map_or(current.status, |b| b.status);
            return Err(BookingError::invalid_transition(booking_id, status, "complete"));
        };

        tracing::info!(
            operation = "complete_booking",
            booking_id = %booking.id,
            actor = %cmd.actor,
            "Booking completed"
        );

        let event = BookingEvent::Completed {
            booking_id,
            user_id: booking.user_id.clone(),
            consultant_id: consultant.clone(),
        };
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));

        Ok(CompleteBookingResult { booking, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::booking::BookingStatus;
    use chrono::Duration;

    fn handler(fx: &Fixture) -> CompleteBookingHandler {
        CompleteBookingHandler::new(fx.store(), fx.notifier.clone())
    }

    fn cmd(booking_id: BookingId, actor: Actor) -> CompleteBookingCommand {
        CompleteBookingCommand { booking_id, actor }
    }

    #[tokio::test]
    async fn assigned_consultant_completes_on_session_day() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;

        let result = handler(&fx)
            .handle(cmd(booking.id, consultant("c-1")))
            .await
            .unwrap();

        assert_eq!(result.booking.status, BookingStatus::Completed);
        assert_eq!(fx.sink.settle(1).await[0].recipient, "u-1");
    }

    #[tokio::test]
    async fn other_consultant_is_unauthorized() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;

        let err = handler(&fx)
            .handle(cmd(booking.id, consultant("c-2")))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn pending_booking_cannot_complete() {
        let fx = Fixture::new();
        let booking = fx.pending_booking("u-1").await;
        fx.store
            .decide_booking(booking.id, &consultant_id("c-1"), BookingStatus::Declined)
            .await
            .unwrap();

        let err = handler(&fx)
            .handle(cmd(booking.id, consultant("c-1")))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn future_session_cannot_complete_yet() {
        let fx = Fixture::new();
        let booking = fx
            .pending_booking_on("u-1", today() + Duration::days(2))
            .await;
        fx.store
            .decide_booking(booking.id, &consultant_id("c-1"), BookingStatus::Accepted)
            .await
            .unwrap();

        let err = handler(&fx)
            .handle(cmd(booking.id, consultant("c-1")))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::InvalidTransition { .. }));
        let stored = fx.store.find_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Accepted);
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let fx = Fixture::new();
        let id = BookingId::new();
        let err = handler(&fx)
            .handle(cmd(id, consultant("c-1")))
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::NotFound(id));
    }
}
