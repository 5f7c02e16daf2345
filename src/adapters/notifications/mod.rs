//! Notification sinks.
//!
//! - `WebhookNotificationSink` - Signed JSON POST to a configured URL
//! - `LoggingNotificationSink` - Writes notifications to the log
//! - `InMemoryNotificationSink` - Records notifications for tests

mod in_memory;
mod logging;
mod webhook;

pub use in_memory::InMemoryNotificationSink;
pub use logging::LoggingNotificationSink;
pub use webhook::{sign_payload, WebhookConfig, WebhookNotificationSink, SIGNATURE_HEADER};
