//! Authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum HS256 key length accepted outside development.
const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// Bearer token verification settings (HS256)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC key for token signatures
    pub jwt_secret: Secret<String>,

    /// Expected `iss` claim; not checked when unset
    #[serde(default)]
    pub issuer: Option<String>,

    /// Allowed clock skew for `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// Staging and production require a secret of at least 32 bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment != Environment::Development && secret.len() < MIN_PRODUCTION_SECRET_BYTES {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_BYTES));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Secret::new(String::new()),
            issuer: None,
            leeway_secs: default_leeway(),
        }
    }
}

fn default_leeway() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: Secret::new(secret.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_missing_secret() {
        assert!(AuthConfig::default()
            .validate(&Environment::Development)
            .is_err());
    }

    #[test]
    fn test_short_secret_allowed_only_in_development() {
        let config = with_secret("dev-secret");
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::JwtSecretTooShort(32))
        );
    }

    #[test]
    fn test_long_secret_valid_in_production() {
        let config = with_secret(&"k".repeat(48));
        assert!(config.validate(&Environment::Production).is_ok());
        assert_eq!(config.leeway_secs, 30);
    }
}
