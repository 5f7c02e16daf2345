//! Webhook notification sink.
//!
//! POSTs each notification as JSON to a configured URL. The body is signed
//! with HMAC-SHA256 and the lowercase hex digest is sent in
//! `X-CompanionX-Signature`, so receivers can verify the sender.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Notification, NotificationSink};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "X-CompanionX-Signature";

/// Webhook delivery settings.
#[derive(Clone)]
pub struct WebhookConfig {
    url: String,
    signing_secret: Secret<String>,
    timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>, signing_secret: Secret<String>) -> Self {
        Self {
            url: url.into(),
            signing_secret,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Signs `body` with `secret`, returning the lowercase hex digest.
pub fn sign_payload(secret: &Secret<String>, body: &[u8]) -> Result<String, DomainError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).map_err(|e| {
        DomainError::new(ErrorCode::InternalError, format!("Invalid signing key: {}", e))
    })?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Notification sink that delivers to an HTTP endpoint.
pub struct WebhookNotificationSink {
    config: WebhookConfig,
    http_client: reqwest::Client,
}

impl WebhookNotificationSink {
    pub fn new(config: WebhookConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to build webhook client: {}", e),
                )
            })?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError> {
        let body = serde_json::to_vec(&notification).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize notification: {}", e),
            )
        })?;
        let signature = sign_payload(&self.config.signing_secret, &body)?;

        let response = self
            .http_client
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::NotificationError,
                    format!("Webhook delivery failed: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::new(
                ErrorCode::NotificationError,
                format!("Webhook responded with {}", status),
            )
            .with_detail("kind", notification.kind()));
        }

        tracing::debug!(
            kind = notification.kind(),
            recipient = %notification.recipient,
            "Notification delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> Secret<String> {
        Secret::new(s.to_string())
    }

    #[test]
    fn signature_matches_independent_hmac() {
        let body = br#"{"recipient":"user-1"}"#;
        let mut mac = Hmac::<Sha256>::new_from_slice(b"whsec").unwrap();
        mac.update(body);
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign_payload(&secret("whsec"), body).unwrap(), expected);
    }

    #[test]
    fn signature_is_lowercase_hex_of_sha256_width() {
        let sig = sign_payload(&secret("k"), b"payload").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn different_secrets_give_different_signatures() {
        let a = sign_payload(&secret("one"), b"body").unwrap();
        let b = sign_payload(&secret("two"), b"body").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn config_defaults_to_five_second_timeout() {
        let config = WebhookConfig::new("http://localhost:9000/hook", secret("s"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        let config = config.with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_notification_failure() {
        let config = WebhookConfig::new("http://127.0.0.1:9/hook", secret("s"))
            .with_timeout(Duration::from_millis(200));
        let sink = WebhookNotificationSink::new(config).unwrap();
        let notification = Notification::new(
            "user-1",
            crate::domain::foundation::EventEnvelope::new(
                "booking.accepted.v1",
                "b-1",
                "Booking",
                serde_json::json!({}),
            ),
        );

        let err = sink.notify(notification).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotificationError);
    }
}
