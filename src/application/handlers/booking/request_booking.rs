//! RequestBookingHandler - Command handler for creating booking requests.

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::booking::{Booking, BookingError, BookingEvent};
use crate::domain::foundation::{today, Actor, ConsultantId};
use crate::ports::EntityStore;

/// Command to request a counselling session.
#[derive(Debug, Clone)]
pub struct RequestBookingCommand {
    pub actor: Actor,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    /// Offers the booking to one consultant only.
    pub preferred_consultant: Option<ConsultantId>,
}

#[derive(Debug, Clone)]
pub struct RequestBookingResult {
    pub booking: Booking,
    pub event: BookingEvent,
}

pub struct RequestBookingHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl RequestBookingHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(
        &self,
        cmd: RequestBookingCommand,
    ) -> Result<RequestBookingResult, BookingError> {
        let user = cmd
            .actor
            .as_user()
            .ok_or_else(|| BookingError::unauthorized(None, "request", &cmd.actor))?;

        let booking = Booking::request(
            user.clone(),
            cmd.preferred_date,
            cmd.preferred_time,
            cmd.preferred_consultant,
            today(),
        )?;

        self.store.insert_booking(&booking).await?;

        tracing::info!(
            operation = "request_booking",
            booking_id = %booking.id,
            actor = %cmd.actor,
            preferred_date = %booking.preferred_date,
            "Booking requested"
        );

        let event = BookingEvent::requested(&booking);
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));

        Ok(RequestBookingResult { booking, event })
    }
}
