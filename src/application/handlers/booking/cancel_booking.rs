//! CancelBookingHandler - Command handler for cancelling accepted bookings.
//!
//! The status change and the refund are one unit of work: if the refund
//! step fails the transaction is dropped and the booking stays accepted.

use std::sync::Arc;

use crate::application::handlers::payment::refund_within;
use crate::application::Notifier;
use crate::domain::booking::{Booking, BookingError, BookingEvent, BookingStatus, CancellationParty};
use crate::domain::foundation::{Actor, BookingId};
use crate::domain::payment::{Payment, PaymentEvent};
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct CancelBookingCommand {
    pub booking_id: BookingId,
    pub actor: Actor,
}

#[derive(Debug, Clone)]
pub struct CancelBookingResult {
    pub booking: Booking,
    pub cancelled_by: CancellationParty,
    /// The refunded payment, when one was captured.
    pub refund: Option<Payment>,
}

pub struct CancelBookingHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl CancelBookingHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(
        &self,
        cmd: CancelBookingCommand,
    ) -> Result<CancelBookingResult, BookingError> {
        let booking_id = cmd.booking_id;
        let mut tx = self.store.begin().await?;

        let mut booking = tx
            .lock_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;
        let party = booking.cancel(&cmd.actor).map_err(|err| {
            tracing::warn!(
                operation = "cancel_booking",
                booking_id = %booking_id,
                actor = %cmd.actor,
                error = %err,
                "Cancellation rejected"
            );
            err
        })?;

        if !tx
            .transition_booking(booking_id, BookingStatus::Accepted, booking.status)
            .await?
        {
            return Err(BookingError::invalid_transition(
                booking_id,
                BookingStatus::Accepted,
                "cancel",
            ));
        }

        let refund = match refund_within(&mut *tx, booking_id, party).await {
            Ok(refund) => refund,
            Err(err) => {
                tracing::error!(
                    operation = "cancel_booking",
                    booking_id = %booking_id,
                    actor = %cmd.actor,
                    error = %err,
                    "Refund failed, cancellation rolled back"
                );
                return Err(err.into());
            }
        };
        tx.commit().await?;

        tracing::info!(
            operation = "cancel_booking",
            booking_id = %booking_id,
            actor = %cmd.actor,
            cancelled_by = %party,
            refunded = refund.is_some(),
            "Booking cancelled"
        );

        // Set for every accepted booking.
        if let Some(consultant_id) = booking.consultant_id.clone() {
            let event = BookingEvent::Cancelled {
                booking_id,
                user_id: booking.user_id.clone(),
                consultant_id,
                cancelled_by: party,
            };
            self.notifier
                .dispatch(event.recipient(), &event, Some(&cmd.actor));
        }
        if let Some(payment) = &refund {
            let event = PaymentEvent::refunded(payment, party);
            self.notifier
                .dispatch(Some(event.recipient()), &event, Some(&cmd.actor));
        }

        Ok(CancelBookingResult {
            booking,
            cancelled_by: party,
            refund,
        })
    }
}
