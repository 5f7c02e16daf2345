//! Notification delivery configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::notifications::WebhookConfig;

use super::error::ValidationError;
use super::server::Environment;

/// Where lifecycle notifications go. Without a webhook URL they are only
/// logged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// HMAC key for the signature header; required with a webhook URL
    #[serde(default)]
    pub signing_secret: Option<Secret<String>>,

    /// Per-delivery timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl NotificationConfig {
    /// Webhook settings, or `None` when deliveries should only be logged.
    pub fn webhook(&self) -> Option<WebhookConfig> {
        let url = self.webhook_url.as_ref()?;
        let secret = self.signing_secret.clone()?;
        let config = WebhookConfig::new(url.clone(), secret);
        Some(match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let Some(url) = &self.webhook_url else {
            return Ok(());
        };
        if self.signing_secret.is_none() {
            return Err(ValidationError::MissingRequired("NOTIFICATIONS__SIGNING_SECRET"));
        }
        let https = url.starts_with("https://");
        if !https && (*environment == Environment::Production || !url.starts_with("http://")) {
            return Err(ValidationError::InvalidWebhookUrl);
        }
        if self.timeout_secs == Some(0) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}
