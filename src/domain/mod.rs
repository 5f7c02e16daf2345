//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, actor, errors)
//! - `booking` - Counselling session booking lifecycle
//! - `payment` - Payment capture and refund tiering
//! - `circle` - Support circles and the join request lifecycle

pub mod booking;
pub mod circle;
pub mod foundation;
pub mod payment;
