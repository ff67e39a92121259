use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, instrument};

use super::{Notification, Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    sender: Option<String>,
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, sender: Option<String>) -> Result<Self, NotifyError> {
        Self::with_timeout(url, sender, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        sender: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            sender,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, notification), fields(subject = %notification.subject))]
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = json!({
            "to": notification.recipient,
            "from": self.sender,
            "subject": notification.subject,
            "body": notification.body,
            "timestamp": Utc::now().to_rfc3339()
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send webhook alert: {}", e);
                NotifyError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Webhook alert failed with status: {}", status);
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Successfully sent webhook alert");
        Ok(())
    }
}
