//! Bearer token authentication for axum.
//!
//! - `auth_middleware` verifies an HS256 `Authorization: Bearer` token and
//!   injects the resolved [`Actor`] into request extensions
//! - `RequireAuth` extracts that actor, rejecting unauthenticated requests
//!
//! ```text
//! Request → auth_middleware → injects Actor into extensions
//!                                     ↓
//!                             Handler → RequireAuth reads from extensions
//! ```
//!
//! Tokens carry the caller id in `sub` and one of `user`, `consultant` or
//! `admin` in `role`.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{Actor, AuthError, Role};

use super::dto::ErrorResponse;

/// Claims the API reads from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Verifies HS256 tokens and resolves them to an [`Actor`].
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &Secret<String>, issuer: Option<&str>, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        match issuer {
            Some(issuer) => {
                // jsonwebtoken only checks `iss` when the claim is present.
                validation.set_required_spec_claims(&["exp", "sub", "iss"]);
                validation.set_issuer(&[issuer]);
            }
            None => validation.set_required_spec_claims(&["exp", "sub"]),
        }

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.issuer.as_deref(), config.leeway_secs)
    }

    pub fn verify(&self, token: &str) -> Result<Actor, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                tracing::debug!("Token expired");
                AuthError::TokenExpired
            }
            ErrorKind::InvalidIssuer => {
                tracing::warn!("Invalid issuer in token");
                AuthError::InvalidToken
            }
            _ => {
                tracing::warn!("Token validation failed: {}", e);
                AuthError::InvalidToken
            }
        })?;

        Actor::from_parts(data.claims.role, data.claims.sub)
            .map_err(|e| AuthError::InvalidClaims(e.to_string()))
    }
}

/// Auth middleware state.
pub type AuthState = Arc<JwtVerifier>;

/// Verifies the bearer token, if any.
///
/// A request without a token continues unauthenticated so `RequireAuth`
/// can reject it; a present but invalid token is rejected here with 401.
pub async fn auth_middleware(
    State(verifier): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return next.run(request).await;
    };

    match verifier.verify(token) {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(e) => AuthRejection::Invalid(e).into_response(),
    }
}

/// Extractor that requires an authenticated caller.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Invalid(AuthError::MissingToken))
    }
}

/// Authentication failure response.
#[derive(Debug)]
pub enum AuthRejection {
    Invalid(AuthError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let AuthRejection::Invalid(err) = self;
        let message = match err {
            AuthError::MissingToken => "Authentication required",
            AuthError::TokenExpired => "Token expired",
            AuthError::InvalidToken => "Invalid token",
            AuthError::InvalidClaims(_) => "Token claims rejected",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("AUTH_ERROR", message)),
        )
            .into_response()
    }
}
