//! PostgreSQL adapters.
//!
//! - `PostgresEntityStore` - Bookings, payments, circles and join requests

mod entity_store;

pub use entity_store::{PostgresEntityStore, PostgresTransaction};
