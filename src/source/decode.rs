//! Decoding of the API's double-encoded payloads
//!
//! Every response body is a JSON string literal whose content is itself a
//! JSON document:
//!
//! ```text
//! "[{\"variablenamecv\":\"Temperature\",\"resultid\":1234}, ...]"
//! ```

use std::collections::HashMap;

use chrono::DateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use super::{Catalog, Sample, SourceError};

/// Unwrap the outer string and parse the embedded document
pub fn double_encoded<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    let inner: String = serde_json::from_str(body).map_err(SourceError::OuterPayload)?;
    serde_json::from_str(&inner).map_err(SourceError::InnerPayload)
}

/// Build the catalog from a `get_sampling_feature_metadata` response.
///
/// Entries without a string `variablenamecv` or a numeric `resultid` are
/// skipped.
pub fn catalog(body: &str) -> Result<Catalog, SourceError> {
    let entries: Vec<Value> = double_encoded(body)?;

    let catalog = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("variablenamecv")?.as_str()?;
            let id = entry.get("resultid")?.as_f64()?;
            Some((name.to_string(), format!("{}", id as i64)))
        })
        .collect::<Catalog>();
    trace!(
        "decoded catalog with {} of {} entries",
        catalog.len(),
        entries.len()
    );

    Ok(catalog)
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(default)]
    datavalue: Option<HashMap<String, Option<f64>>>,
    #[serde(default)]
    valuedatetime: Option<HashMap<String, i64>>,
}

/// Decode a `get_result_timeseries` response into samples ordered by time.
///
/// The value and timestamp maps are joined on their keys; `null` values and
/// keys without a timestamp are dropped. A `null` map counts as empty.
pub fn time_series(body: &str) -> Result<Vec<Sample>, SourceError> {
    let series: TimeSeries = double_encoded(body)?;
    let values = series.datavalue.unwrap_or_default();
    let times = series.valuedatetime.unwrap_or_default();

    let mut samples = values
        .iter()
        .filter_map(|(key, value)| {
            let value = (*value)?;
            let millis = *times.get(key)?;
            let observed_at = DateTime::from_timestamp_millis(millis)?;
            Some(Sample { value, observed_at })
        })
        .collect::<Vec<_>>();
    samples.sort_by_key(|sample| sample.observed_at);

    Ok(samples)
}
