use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde_json::json;
use tracing::{instrument, trace};

use super::{Catalog, DataSource, Sample, SourceError, decode};
use crate::config::SourceConfig;

const ORIGIN: &str = "https://monitormywatershed.org";
const REFERER: &str = "https://monitormywatershed.org/tsv/";

/// Client for the Monitor My Watershed data loader endpoint
#[derive(Debug, Clone)]
pub struct WatershedClient {
    client: Client,
    base_url: String,
}

impl WatershedClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// POST one `request_data` document and return the raw body
    async fn post(&self, request_data: serde_json::Value) -> Result<String, SourceError> {
        trace!("{}: requesting {request_data}", self.base_url);

        let response = self
            .client
            .post(&self.base_url)
            .header("Origin", ORIGIN)
            .header("Referer", REFERER)
            .form(&[("request_data", request_data.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl DataSource for WatershedClient {
    #[instrument(skip(self))]
    async fn get_catalog(&self, sampling_feature_code: &str) -> Result<Catalog, SourceError> {
        let body = self
            .post(json!({
                "method": "get_sampling_feature_metadata",
                "sampling_feature_code": sampling_feature_code,
            }))
            .await?;

        decode::catalog(&body)
    }

    #[instrument(skip(self))]
    async fn get_recent_readings(
        &self,
        series_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, SourceError> {
        let body = self
            .post(json!({
                "method": "get_result_timeseries",
                "resultid": series_id,
                "start_date": start.to_rfc3339_opts(SecondsFormat::Secs, true),
                "end_date": end.to_rfc3339_opts(SecondsFormat::Secs, true),
            }))
            .await?;

        decode::time_series(&body)
    }
}
