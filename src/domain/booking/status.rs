//! Booking status state machine.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a counselling booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Requested by a user, awaiting a consultant's decision.
    Pending,

    /// A consultant committed to the session.
    Accepted,

    /// A consultant turned the request down.
    Declined,

    /// The session took place.
    Completed,

    CancelledByUser,

    CancelledByConsultant,
}

impl BookingStatus {
    /// Storage representation, identical to the serde name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Declined => "declined",
            BookingStatus::Completed => "completed",
            BookingStatus::CancelledByUser => "cancelled_by_user",
            BookingStatus::CancelledByConsultant => "cancelled_by_consultant",
        }
    }

    /// Status a cancellation by `party` leads to.
    pub fn cancelled_by(party: CancellationParty) -> Self {
        match party {
            CancellationParty::User => BookingStatus::CancelledByUser,
            CancellationParty::Consultant => BookingStatus::CancelledByConsultant,
        }
    }

    /// Party recorded by a cancelled status.
    pub fn cancellation_party(&self) -> Option<CancellationParty> {
        match self {
            BookingStatus::CancelledByUser => Some(CancellationParty::User),
            BookingStatus::CancelledByConsultant => Some(CancellationParty::Consultant),
            _ => None,
        }
    }

    /// True once a consultant decision (accept or decline) has been recorded.
    pub fn is_decided(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

impl StateMachine for BookingStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use BookingStatus::*;
        match self {
            Pending => vec![Accepted, Declined],
            Accepted => vec![Completed, CancelledByUser, CancelledByConsultant],
            Declined | Completed | CancelledByUser | CancelledByConsultant => vec![],
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "declined" => Ok(BookingStatus::Declined),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled_by_user" => Ok(BookingStatus::CancelledByUser),
            "cancelled_by_consultant" => Ok(BookingStatus::CancelledByConsultant),
            other => Err(ValidationError::invalid_format(
                "booking_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// Who cancelled an accepted booking. Drives refund tiering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationParty {
    User,
    Consultant,
}

impl fmt::Display for CancellationParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancellationParty::User => write!(f, "user"),
            CancellationParty::Consultant => write!(f, "consultant"),
        }
    }
}
