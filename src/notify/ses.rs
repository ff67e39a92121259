//! Email delivery through AWS SES v2

use async_trait::async_trait;
use aws_sdk_sesv2::Client;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use tracing::{debug, error, info, instrument};

use super::{Notification, Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct SesNotifier {
    client: Client,
    sender: Option<String>,
}

impl SesNotifier {
    pub fn new(client: Client, sender: Option<String>) -> Self {
        Self { client, sender }
    }

    /// Build a notifier from the ambient AWS configuration
    pub async fn from_env(sender: Option<String>, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self::new(Client::new(&config), sender)
    }

    fn build_content(notification: &Notification) -> Result<EmailContent, NotifyError> {
        let text = |data: &str| {
            Content::builder()
                .data(data)
                .charset("UTF-8")
                .build()
                .map_err(|e| NotifyError::Config(e.to_string()))
        };

        let message = Message::builder()
            .subject(text(&notification.subject)?)
            .body(Body::builder().text(text(&notification.body)?).build())
            .build();

        Ok(EmailContent::builder().simple(message).build())
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    #[instrument(skip(self, notification), fields(subject = %notification.subject))]
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(sender) = &self.sender else {
            return Err(NotifyError::Config("no sender address configured".to_string()));
        };
        debug!(
            "sending email from {sender} to {}: {}",
            notification.recipient, notification.subject
        );

        let output = self
            .client
            .send_email()
            .from_email_address(sender)
            .destination(
                Destination::builder()
                    .to_addresses(&notification.recipient)
                    .build(),
            )
            .content(Self::build_content(notification)?)
            .send()
            .await
            .map_err(|e| {
                error!("SES send failed: {e}");
                NotifyError::Request(e.to_string())
            })?;

        info!(
            "email sent, message id: {}",
            output.message_id().unwrap_or("<none>")
        );
        Ok(())
    }
}
