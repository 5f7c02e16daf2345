//! Circle handlers.
//!
//! ## Commands
//! - Creating circles, changing status and lead (admin)
//! - Requesting to join, withdrawing a request (user)
//! - Approving or rejecting requests under capacity (admin)
//!
//! ## Queries
//! - Pending join requests (admin)
//! - Circle roster

mod cancel_join_request;
mod circle_queries;
mod decide_join_request;
mod manage_circle;
mod request_join;

// Commands
pub use cancel_join_request::{CancelJoinRequestCommand, CancelJoinRequestHandler};
pub use decide_join_request::{DecideJoinRequestCommand, DecideJoinRequestHandler};
pub use manage_circle::{
    ChangeCircleLeadCommand, ChangeCircleLeadHandler, CreateCircleCommand, CreateCircleHandler,
    SetCircleStatusCommand, SetCircleStatusHandler,
};
pub use request_join::{RequestJoinCommand, RequestJoinHandler};

// Queries
pub use circle_queries::{
    CircleRoster, GetCircleRosterHandler, GetCircleRosterQuery, ListPendingRequestsHandler,
    ListPendingRequestsQuery,
};
