//! Circle join request: a user's request for a seat and its decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    AdminId, CircleId, JoinRequestId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{has_capacity, Circle, CircleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
    /// Withdrawn by the requester before a decision.
    Cancelled,
}

impl JoinRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "pending",
            JoinRequestStatus::Approved => "approved",
            JoinRequestStatus::Rejected => "rejected",
            JoinRequestStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses that block another request for the same circle and user.
    pub fn is_live(&self) -> bool {
        matches!(self, JoinRequestStatus::Pending | JoinRequestStatus::Approved)
    }
}

impl StateMachine for JoinRequestStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use JoinRequestStatus::*;
        match self {
            Pending => vec![Approved, Rejected, Cancelled],
            Approved | Rejected | Cancelled => vec![],
        }
    }
}

impl fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JoinRequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JoinRequestStatus::Pending),
            "approved" => Ok(JoinRequestStatus::Approved),
            "rejected" => Ok(JoinRequestStatus::Rejected),
            "cancelled" => Ok(JoinRequestStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "join_request_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// Administrator's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> JoinRequestStatus {
        match self {
            Decision::Approve => JoinRequestStatus::Approved,
            Decision::Reject => JoinRequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: JoinRequestId,
    pub circle_id: CircleId,
    pub user_id: UserId,
    pub status: JoinRequestStatus,
    pub requested_at: Timestamp,
    pub decided_at: Option<Timestamp>,
    pub decided_by: Option<AdminId>,
}

impl JoinRequest {
    /// Opens a pending request for `user` on `circle`, which currently has
    /// `approved` members.
    pub fn open(circle: &Circle, user: UserId, approved: u32) -> Result<Self, CircleError> {
        if !circle.is_active() {
            return Err(CircleError::CircleInactive(circle.id));
        }
        if !has_capacity(circle, approved) {
            return Err(CircleError::CircleFull(circle.id));
        }
        Ok(Self {
            id: JoinRequestId::new(),
            circle_id: circle.id,
            user_id: user,
            status: JoinRequestStatus::Pending,
            requested_at: Timestamp::now(),
            decided_at: None,
            decided_by: None,
        })
    }

    /// Applies an administrator's decision. Approval also needs the circle
    /// to be active and to have room given `approved` current members.
    pub fn decide(
        &mut self,
        decision: Decision,
        admin: &AdminId,
        circle: &Circle,
        approved: u32,
    ) -> Result<(), CircleError> {
        if self.status != JoinRequestStatus::Pending {
            return Err(self.invalid_transition(decision_verb(decision)));
        }
        if decision == Decision::Approve {
            if !circle.is_active() {
                return Err(CircleError::CircleInactive(circle.id));
            }
            if !has_capacity(circle, approved) {
                return Err(CircleError::CircleFull(circle.id));
            }
        }
        self.transition_to(decision.target_status(), decision_verb(decision))?;
        self.decided_at = Some(Timestamp::now());
        self.decided_by = Some(admin.clone());
        Ok(())
    }

    /// Withdraws a pending request on behalf of its requester.
    pub fn cancel_by(&mut self, user: &UserId) -> Result<(), CircleError> {
        self.check_cancellable_by(user)?;
        self.transition_to(JoinRequestStatus::Cancelled, "cancel")
    }

    pub fn check_cancellable_by(&self, user: &UserId) -> Result<(), CircleError> {
        if &self.user_id != user {
            return Err(CircleError::unauthorized("cancel join request", format!("user:{}", user)));
        }
        if self.status != JoinRequestStatus::Pending {
            return Err(self.invalid_transition("cancel"));
        }
        Ok(())
    }

    fn invalid_transition(&self, attempted: &'static str) -> CircleError {
        CircleError::InvalidTransition {
            request_id: self.id,
            current: self.status,
            attempted,
        }
    }

    fn transition_to(
        &mut self,
        target: JoinRequestStatus,
        attempted: &'static str,
    ) -> Result<(), CircleError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| self.invalid_transition(attempted))?;
        Ok(())
    }
}

fn decision_verb(decision: Decision) -> &'static str {
    match decision {
        Decision::Approve => "approve",
        Decision::Reject => "reject",
    }
}
