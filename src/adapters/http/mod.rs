//! HTTP adapter - JSON REST API over the lifecycle handlers.

mod auth;
mod bookings;
mod circles;
mod dto;
mod error;
mod router;
mod state;

pub use auth::{auth_middleware, Claims, JwtVerifier, RequireAuth};
pub use dto::ErrorResponse;
pub use error::ApiError;
pub use router::api_router;
pub use state::{AppState, BookingHandlers, CircleHandlers};

use std::str::FromStr;

/// Parses a path id, answering 400 when it is malformed.
fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} id: {}", what, raw)))
}
