//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Each handler owns one unit of work against the entity store and hands
//! notifications to the [`Notifier`] only after commit.

pub mod handlers;
mod notifier;

pub use notifier::Notifier;
