//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the caller identity, event envelope
//! and error types that form the vocabulary of the CompanionX lifecycles.

mod actor;
mod errors;
mod events;
mod ids;
mod money;
mod percentage;
mod state_machine;
mod timestamp;

pub use actor::{Actor, AuthError, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventEnvelope, EventId, EventMetadata, LifecycleEvent};
pub use ids::{AdminId, BookingId, CircleId, ConsultantId, JoinRequestId, PaymentId, UserId};
pub use money::Money;
pub use percentage::Percentage;
pub use state_machine::StateMachine;
pub use timestamp::{today, Timestamp};
