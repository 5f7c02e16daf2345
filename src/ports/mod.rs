//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the lifecycles and the outside world. Adapters implement these ports.
//!
//! - `EntityStore` / `StoreTransaction` - Durable storage with conditional
//!   writes and a unit of work for multi-row operations
//! - `NotificationSink` - Best-effort, post-commit notification delivery

mod entity_store;
mod notification_sink;

pub use entity_store::{EntityStore, InsertOutcome, StoreTransaction};
pub use notification_sink::{Notification, NotificationSink};
