//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, one
//! module per lifecycle.

pub mod booking;
pub mod circle;
pub mod payment;

#[cfg(test)]
pub(crate) mod test_support;
