//! The envelope every lifecycle event travels in once it leaves the domain.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// Implemented by the booking, payment and circle event enums.
pub trait LifecycleEvent: Serialize + Send + Sync {
    /// Dotted, versioned routing key such as `booking.accepted.v1`.
    fn event_type(&self) -> &'static str;

    fn aggregate_id(&self) -> String;

    fn aggregate_type(&self) -> &'static str;

    fn to_envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        let payload = serde_json::to_value(self)?;
        Ok(EventEnvelope::new(
            self.event_type(),
            self.aggregate_id(),
            self.aggregate_type(),
            payload,
        ))
    }
}

/// Fresh per envelope; receivers dedupe on it when a delivery is retried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// `role:id` of the caller whose command produced the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            event_type: event_type.into(),
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.metadata.actor = Some(actor.into());
        self
    }

    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct SeatHeld {
        circle_id: String,
    }

    impl LifecycleEvent for SeatHeld {
        fn event_type(&self) -> &'static str {
            "circle.seat_held.v1"
        }

        fn aggregate_id(&self) -> String {
            self.circle_id.clone()
        }

        fn aggregate_type(&self) -> &'static str {
            "Circle"
        }
    }

    #[test]
    fn envelope_routes_by_event_and_aggregate() {
        let event = SeatHeld {
            circle_id: "c-42".into(),
        };
        let envelope = event.to_envelope().unwrap();

        assert_eq!(envelope.event_type, "circle.seat_held.v1");
        assert_eq!(envelope.aggregate_id, "c-42");
        assert_eq!(envelope.aggregate_type, "Circle");
        assert_eq!(envelope.payload_as::<SeatHeld>().unwrap(), event);
    }

    #[test]
    fn every_envelope_gets_its_own_id() {
        let a = EventEnvelope::new("x.v1", "1", "X", json!({}));
        let b = EventEnvelope::new("x.v1", "1", "X", json!({}));
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn actor_is_omitted_until_set() {
        let envelope = EventEnvelope::new("x.v1", "1", "X", json!({}));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["metadata"], json!({}));

        let envelope = envelope.with_actor("admin:a-1");
        assert_eq!(envelope.metadata.actor.as_deref(), Some("admin:a-1"));
    }

    #[test]
    fn payload_of_another_shape_is_an_error() {
        let envelope = EventEnvelope::new("x.v1", "1", "X", json!({"other": 1}));
        assert!(envelope.payload_as::<SeatHeld>().is_err());
    }
}
