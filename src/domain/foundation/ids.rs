//! Identifiers.
//!
//! Rows the service creates get UUID ids. Principals (users, consultants,
//! admins) are named by the identity provider, so their ids are opaque
//! non-empty strings taken from the token subject.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

macro_rules! principal_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Rejects blank ids.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// A counselling session request.
    BookingId
);
uuid_id!(
    /// One captured payment; at most one per booking.
    PaymentId
);
uuid_id!(CircleId);
uuid_id!(
    /// One membership row: a user's request to join a circle.
    JoinRequestId
);

principal_id!(UserId, "user_id");
principal_id!(ConsultantId, "consultant_id");
principal_id!(AdminId, "admin_id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_id_round_trips_through_string() {
        let id = BookingId::new();
        let parsed: BookingId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn distinct_ids_are_unique() {
        assert_ne!(CircleId::new(), CircleId::new());
        assert_ne!(JoinRequestId::new(), JoinRequestId::new());
    }

    #[test]
    fn payment_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<PaymentId>().is_err());
    }

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
        assert_eq!(UserId::new("user-7").unwrap().as_str(), "user-7");
    }

    #[test]
    fn consultant_id_deserialization_validates() {
        let ok: Result<ConsultantId, _> = serde_json::from_str("\"c-42\"");
        assert_eq!(ok.unwrap().as_str(), "c-42");

        let empty: Result<ConsultantId, _> = serde_json::from_str("\"\"");
        assert!(empty.is_err());
    }

    #[test]
    fn admin_id_serializes_as_plain_string() {
        let id = AdminId::new("root").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"root\"");
    }
}
