//! In-memory adapters for tests and local development.

mod entity_store;

pub use entity_store::InMemoryEntityStore;
