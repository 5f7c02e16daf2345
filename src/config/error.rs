use thiserror::Error;

/// Startup failure: the environment could not be read or did not validate.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    ValidationFailed(#[from] ValidationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingRequired(&'static str),

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("cannot listen on {0}")]
    InvalidAddress(String),

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database URL must be a postgres:// or postgresql:// URL")]
    InvalidDatabaseUrl,

    #[error("database min_connections is above max_connections")]
    InvalidPoolSize,

    #[error("database max_connections is above 100")]
    PoolSizeTooLarge,

    #[error("JWT secret needs at least {0} bytes outside development")]
    JwtSecretTooShort(usize),

    #[error("{tier} session fee '{value}' is not a positive amount")]
    InvalidPrice { tier: &'static str, value: String },

    #[error("reduced session fee is above the standard fee")]
    ReducedAboveStandard,

    #[error("webhook URL must be http(s), and https in production")]
    InvalidWebhookUrl,
}
