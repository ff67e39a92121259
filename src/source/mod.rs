//! Access to the remote water-quality data API

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod decode;
pub mod http;

pub use http::WatershedClient;

/// Measurement name → opaque series identifier
pub type Catalog = HashMap<String, String>;

/// One value of a series together with its observation time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("response is not a JSON string: {0}")]
    OuterPayload(#[source] serde_json::Error),

    #[error("embedded document is malformed: {0}")]
    InnerPayload(#[source] serde_json::Error),
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the series identifiers available at a sampling site
    async fn get_catalog(&self, sampling_feature_code: &str) -> Result<Catalog, SourceError>;

    /// Fetch the samples of one series between `start` and `end`, ordered by
    /// observation time
    async fn get_recent_readings(
        &self,
        series_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, SourceError>;
}
