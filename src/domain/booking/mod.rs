//! Booking domain module.
//!
//! Counselling session requests and their consultant-driven lifecycle.
//!
//! # Module Structure
//!
//! - `aggregate` - Booking aggregate and transition rules
//! - `status` - BookingStatus state machine and cancellation party
//! - `errors` - BookingError
//! - `events` - BookingEvent notifications

mod aggregate;
mod errors;
mod events;
mod status;

pub use aggregate::Booking;
pub use errors::BookingError;
pub use events::BookingEvent;
pub use status::{BookingStatus, CancellationParty};
