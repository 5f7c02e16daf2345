//! Process configuration, read once at startup.
//!
//! Values come from `COMPANIONX__<SECTION>__<KEY>` environment variables,
//! with a `.env` file consulted first in development. Only
//! `DATABASE__URL` and `AUTH__JWT_SECRET` have no default.

mod auth;
mod database;
mod error;
mod notifications;
mod pricing;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use notifications::NotificationConfig;
pub use pricing::PricingConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Reads the environment. Fails when a required section is absent or a
    /// value does not parse; semantic checks live in [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        let source = config::Environment::default()
            .prefix("COMPANIONX")
            .prefix_separator("__")
            .separator("__");

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// Stops at the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = &self.server.environment;
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(environment)?;
        self.pricing.validate()?;
        self.notifications.validate(environment)
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
