//! Webhook notification delivery.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Outbound notification channel.
///
/// Delivery is best-effort: callers log failures and move on instead of
/// propagating them.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver one message body.
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// Message category understood by the webhook endpoint.
pub const CATEGORY_PLAIN_TEXT: &str = "PLAIN_TEXT";

/// Configuration for the webhook notifier.
#[derive(Clone)]
pub struct NotifierConfig {
    /// Webhook endpoint.
    pub url: String,
    /// Access token, sent as a query parameter.
    pub token: String,
    /// Name shown at the top of every message.
    pub display_name: String,
    /// Message category tag.
    pub category: String,
    /// Request timeout. Deliveries are best-effort, so this stays short.
    pub timeout: Duration,
}

// Keeps the token out of logs.
impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("category", &self.category)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            url: "https://webhook.exinwork.com/api/send".to_string(),
            token: String::new(),
            display_name: "listing-watch".to_string(),
            category: CATEGORY_PLAIN_TEXT.to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

/// Format a message body with the sender's display name on top.
pub fn format_message(display_name: &str, message: &str) -> String {
    format!("【{display_name}】\n\n{message}")
}

/// Notifier that posts batched messages to a chat webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    config: NotifierConfig,
}

impl WebhookNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            config,
        }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }
}

#[async_trait]
impl Notify for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let body = format_message(&self.config.display_name, message);

        let response = self
            .client
            .post(&self.config.url)
            .query(&[("access_token", self.config.token.as_str())])
            .form(&[
                ("category", self.config.category.as_str()),
                ("data", body.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        // The endpoint acks with a small JSON body; nothing in it matters
        // beyond it being well-formed.
        response.json::<serde_json::Value>().await?;

        debug!(bytes = body.len(), "notification delivered");
        Ok(())
    }
}
