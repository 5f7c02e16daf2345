//! Payment domain module.
//!
//! Capture against accepted bookings and refund tiering on cancellation.
//!
//! # Module Structure
//!
//! - `aggregate` - Payment aggregate
//! - `status` - PaymentStatus state machine
//! - `instrument` - Payment methods, instrument validation, stored details
//! - `policy` - `refund_policy`, refund plans and price tiers
//! - `errors` - PaymentError
//! - `events` - PaymentEvent notifications

mod aggregate;
mod errors;
mod events;
mod instrument;
mod policy;
mod status;

pub use aggregate::Payment;
pub use errors::PaymentError;
pub use events::PaymentEvent;
pub use instrument::{
    PaymentDetails, PaymentInstrument, PaymentMethod, RefundMarker, ValidatedInstrument,
};
pub use policy::{refund_policy, PriceSchedule, PriceTier, RefundPlan};
pub use status::PaymentStatus;
