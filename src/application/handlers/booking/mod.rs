//! Booking handlers.
//!
//! ## Commands
//! - Requesting a session
//! - Accepting or declining a request (consultant)
//! - Completing a held session (consultant)
//! - Cancelling an accepted booking, with refund
//!
//! ## Queries
//! - Single booking
//! - A user's bookings, a consultant's pending requests and assigned
//!   bookings, every booking for admins

mod cancel_booking;
mod complete_booking;
mod decide_booking;
mod get_booking;
mod list_bookings;
mod request_booking;

// Commands
pub use cancel_booking::{CancelBookingCommand, CancelBookingHandler, CancelBookingResult};
pub use complete_booking::{CompleteBookingCommand, CompleteBookingHandler, CompleteBookingResult};
pub use decide_booking::{
    AcceptBookingCommand, AcceptBookingHandler, DecideBookingResult, DeclineBookingCommand,
    DeclineBookingHandler,
};
pub use request_booking::{RequestBookingCommand, RequestBookingHandler, RequestBookingResult};

// Queries
pub use get_booking::{GetBookingHandler, GetBookingQuery};
pub use list_bookings::{
    ListAllBookingsHandler, ListAllBookingsQuery, ListConsultantBookingsHandler,
    ListConsultantBookingsQuery, ListPendingBookingsHandler, ListPendingBookingsQuery,
    ListUserBookingsHandler, ListUserBookingsQuery,
};
