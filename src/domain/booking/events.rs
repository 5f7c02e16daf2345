//! Booking domain events.
//!
//! Emitted after a transition commits and handed to the notification sink.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookingId, ConsultantId, LifecycleEvent, UserId};

use super::{Booking, CancellationParty};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingEvent {
    Requested {
        booking_id: BookingId,
        user_id: UserId,
        consultant_id: Option<ConsultantId>,
        preferred_date: NaiveDate,
        preferred_time: NaiveTime,
    },

    /// State transition: Pending → Accepted
    Accepted {
        booking_id: BookingId,
        user_id: UserId,
        consultant_id: ConsultantId,
    },

    /// State transition: Pending → Declined
    Declined {
        booking_id: BookingId,
        user_id: UserId,
        consultant_id: ConsultantId,
    },

    /// State transition: Accepted → Completed
    Completed {
        booking_id: BookingId,
        user_id: UserId,
        consultant_id: ConsultantId,
    },

    /// State transition: Accepted → CancelledByUser | CancelledByConsultant
    Cancelled {
        booking_id: BookingId,
        user_id: UserId,
        consultant_id: ConsultantId,
        cancelled_by: CancellationParty,
    },
}

impl BookingEvent {
    pub fn requested(booking: &Booking) -> Self {
        BookingEvent::Requested {
            booking_id: booking.id,
            user_id: booking.user_id.clone(),
            consultant_id: booking.consultant_id.clone(),
            preferred_date: booking.preferred_date,
            preferred_time: booking.preferred_time,
        }
    }

    pub fn booking_id(&self) -> BookingId {
        match self {
            BookingEvent::Requested { booking_id, .. }
            | BookingEvent::Accepted { booking_id, .. }
            | BookingEvent::Declined { booking_id, .. }
            | BookingEvent::Completed { booking_id, .. }
            | BookingEvent::Cancelled { booking_id, .. } => *booking_id,
        }
    }

    /// Who should hear about this event: the other side of the booking.
    pub fn recipient(&self) -> Option<String> {
        match self {
            BookingEvent::Requested { consultant_id, .. } => {
                consultant_id.as_ref().map(|c| c.to_string())
            }
            BookingEvent::Accepted { user_id, .. }
            | BookingEvent::Declined { user_id, .. }
            | BookingEvent::Completed { user_id, .. } => Some(user_id.to_string()),
            BookingEvent::Cancelled {
                user_id,
                consultant_id,
                cancelled_by,
                ..
            } => Some(match cancelled_by {
                CancellationParty::User => consultant_id.to_string(),
                CancellationParty::Consultant => user_id.to_string(),
            }),
        }
    }
}

impl LifecycleEvent for BookingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BookingEvent::Requested { .. } => "booking.requested.v1",
            BookingEvent::Accepted { .. } => "booking.accepted.v1",
            BookingEvent::Declined { .. } => "booking.declined.v1",
            BookingEvent::Completed { .. } => "booking.completed.v1",
            BookingEvent::Cancelled { .. } => "booking.cancelled.v1",
        }
    }

    fn aggregate_id(&self) -> String {
        self.booking_id().to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Booking"
    }
}
