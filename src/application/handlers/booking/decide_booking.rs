//! Accept and decline handlers.
//!
//! Both are a single conditional write. When the write matches no row the
//! booking is re-read to tell a lost race (`AlreadyTaken`) from an invalid
//! request (`InvalidTransition`, `NotFound`).

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::booking::{Booking, BookingError, BookingEvent, BookingStatus};
use crate::domain::foundation::{Actor, BookingId};
use crate::ports::EntityStore;

/// Command for a consultant to accept a pending booking.
#[derive(Debug, Clone)]
pub struct AcceptBookingCommand {
    pub booking_id: BookingId,
    pub actor: Actor,
}

/// Command for a consultant to decline a pending booking.
#[derive(Debug, Clone)]
pub struct DeclineBookingCommand {
    pub booking_id: BookingId,
    pub actor: Actor,
}

#[derive(Debug, Clone)]
pub struct DecideBookingResult {
    pub booking: Booking,
    pub event: BookingEvent,
}

pub struct AcceptBookingHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl AcceptBookingHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(
        &self,
        cmd: AcceptBookingCommand,
    ) -> Result<DecideBookingResult, BookingError> {
        decide(
            self.store.as_ref(),
            &self.notifier,
            cmd.booking_id,
            &cmd.actor,
            BookingStatus::Accepted,
        )
        .await
    }
}

pub struct DeclineBookingHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl DeclineBookingHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(
        &self,
        cmd: DeclineBookingCommand,
    ) -> Result<DecideBookingResult, BookingError> {
        decide(
            self.store.as_ref(),
            &self.notifier,
            cmd.booking_id,
            &cmd.actor,
            BookingStatus::Declined,
        )
        .await
    }
}

async fn decide(
    store: &dyn EntityStore,
    notifier: &Notifier,
    booking_id: BookingId,
    actor: &Actor,
    target: BookingStatus,
) -> Result<DecideBookingResult, BookingError> {
    let attempted = if target == BookingStatus::Accepted {
        "accept"
    } else {
        "decline"
    };
    let consultant = actor
        .as_consultant()
        .ok_or_else(|| BookingError::unauthorized(Some(booking_id), attempted, actor))?;

    let Some(booking) = store.decide_booking(booking_id, consultant, target).await? else {
        let current = store
            .find_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;
        let err = current.classify_lost_decision(consultant, attempted);
        tracing::warn!(
            operation = attempted,
            booking_id = %booking_id,
            actor = %actor,
            current = %current.status,
            error = %err,
            "Booking decision rejected"
        );
        return Err(err);
    };

    tracing::info!(
        operation = attempted,
        booking_id = %booking.id,
        actor = %actor,
        status = %booking.status,
        "Booking decided"
    );

    let (user_id, consultant_id) = (booking.user_id.clone(), consultant.clone());
    let event = if target == BookingStatus::Accepted {
        BookingEvent::Accepted {
            booking_id,
            user_id,
            consultant_id,
        }
    } else {
        BookingEvent::Declined {
            booking_id,
            user_id,
            consultant_id,
        }
    };
    notifier.dispatch(event.recipient(), &event, Some(actor));

    Ok(DecideBookingResult { booking, event })
}
