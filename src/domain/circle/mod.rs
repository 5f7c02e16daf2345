//! Circle domain module.
//!
//! Consultant-led support circles and the join-request lifecycle that keeps
//! approved membership within capacity.
//!
//! # Module Structure
//!
//! - `aggregate` - Circle entity, draft validation, `has_capacity`
//! - `join_request` - JoinRequest and its status state machine
//! - `errors` - CircleError
//! - `events` - CircleEvent notifications

mod aggregate;
mod errors;
mod events;
mod join_request;

pub use aggregate::{
    has_capacity, Circle, CircleCategory, CircleDraft, CircleStatus, MeetingDay, MAX_MEMBERS,
    MIN_MEMBERS,
};
pub use errors::CircleError;
pub use events::CircleEvent;
pub use join_request::{Decision, JoinRequest, JoinRequestStatus};
