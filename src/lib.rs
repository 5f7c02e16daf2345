//! CompanionX - booking, payment and circle membership lifecycles
//!
//! Users request counselling sessions that consultants accept, decline and
//! complete; payments are captured against accepted bookings and refunded by
//! who cancelled; support circles admit members up to a fixed capacity.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
