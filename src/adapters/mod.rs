//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the lifecycles to external systems:
//! - `postgres` - Entity store over PostgreSQL
//! - `memory` - Entity store for tests and local runs
//! - `notifications` - Webhook, logging and recording sinks
//! - `http` - axum REST API

pub mod http;
pub mod memory;
pub mod notifications;
pub mod postgres;

pub use memory::InMemoryEntityStore;
pub use postgres::PostgresEntityStore;
