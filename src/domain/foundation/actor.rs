//! Caller identity for every lifecycle operation.
//!
//! The HTTP edge resolves an `Actor` from a validated token; the lifecycle
//! handlers receive it as an explicit parameter and re-check role and
//! ownership on every state-changing call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{AdminId, ConsultantId, UserId, ValidationError};

/// Role a caller acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Consultant,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Consultant => "consultant",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "consultant" => Ok(Role::Consultant),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Authenticated caller: a role paired with the id valid for that role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Actor {
    User(UserId),
    Consultant(ConsultantId),
    Admin(AdminId),
}

impl Actor {
    /// Builds an actor from a role and a raw subject id.
    pub fn from_parts(role: Role, subject: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(match role {
            Role::User => Actor::User(UserId::new(subject)?),
            Role::Consultant => Actor::Consultant(ConsultantId::new(subject)?),
            Role::Admin => Actor::Admin(AdminId::new(subject)?),
        })
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::User(_) => Role::User,
            Actor::Consultant(_) => Role::Consultant,
            Actor::Admin(_) => Role::Admin,
        }
    }

    /// Raw subject id, independent of role.
    pub fn subject(&self) -> &str {
        match self {
            Actor::User(id) => id.as_str(),
            Actor::Consultant(id) => id.as_str(),
            Actor::Admin(id) => id.as_str(),
        }
    }

    pub fn as_user(&self) -> Option<&UserId> {
        match self {
            Actor::User(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_consultant(&self) -> Option<&ConsultantId> {
        match self {
            Actor::Consultant(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_admin(&self) -> Option<&AdminId> {
        match self {
            Actor::Admin(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Actor {
    /// `role:id`, the form used in logs and event metadata.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role(), self.subject())
    }
}

/// Failures while resolving an `Actor` from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token claims rejected: {0}")]
    InvalidClaims(String),
}

impl AuthError {
    /// Returns true if the caller should obtain a new token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
