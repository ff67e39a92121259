//! Notification senders
//!
//! - **SES** (feature `aws`): plain-text email through AWS SES v2
//! - **Webhook**: JSON payload POSTed to an arbitrary URL (mail relays,
//!   chat bridges, ...)

use async_trait::async_trait;
use serde::Serialize;

#[cfg(feature = "aws")]
pub mod ses;
pub mod webhook;

/// A message ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(String),

    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("notifier is misconfigured: {0}")]
    Config(String),
}

/// Delivers a notification to its recipient
///
/// `Ok(())` means the service accepted the message; only then may the
/// caller consider the alert delivered.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
