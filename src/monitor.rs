//! Monitoring cycle - one pass over every tracked measurement
//!
//! ## Message Flow
//!
//! ```text
//! load ledger → fetch catalog → for each tracked measurement:
//!                                   fetch readings → evaluate each sample
//!             → save ledger → CycleReport
//! ```
//!
//! Everything happens sequentially. Only a catalog failure aborts the cycle;
//! ledger I/O failures and per-measurement fetch failures are logged and
//! contained.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::alerts::{NotificationOutcome, ReadingEvaluator};
use crate::ledger::CooldownLedger;
use crate::measurement::Measurement;
use crate::source::{DataSource, SourceError};
use crate::storage::BlobStore;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("could not fetch measurement catalog: {0}")]
    CatalogFetch(#[source] SourceError),
}

/// Counts gathered during one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Tracked measurements found in the catalog
    pub attempted: usize,
    /// Measurements whose readings were fetched and evaluated
    pub succeeded: usize,
    /// Samples run through the evaluator
    pub evaluated: usize,
    pub sent: usize,
    pub suppressed: usize,
    pub send_failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: NotificationOutcome) {
        match outcome {
            NotificationOutcome::NotNeeded => {}
            NotificationOutcome::Suppressed => self.suppressed += 1,
            NotificationOutcome::Sent => self.sent += 1,
            NotificationOutcome::SendFailed => self.send_failed += 1,
        }
    }
}

pub struct Monitor {
    source: Arc<dyn DataSource>,
    store: Arc<dyn BlobStore>,
    evaluator: ReadingEvaluator,
    sampling_feature_code: String,
    window: chrono::Duration,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn DataSource>,
        store: Arc<dyn BlobStore>,
        evaluator: ReadingEvaluator,
        sampling_feature_code: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            evaluator,
            sampling_feature_code: sampling_feature_code.into(),
            window: chrono::Duration::minutes(5),
        }
    }

    /// Length of the trailing window requested for each measurement
    pub fn with_window(mut self, window: chrono::Duration) -> Self {
        self.window = window;
        self
    }

    #[instrument(skip(self), fields(site = %self.sampling_feature_code))]
    pub async fn run_once(&self) -> Result<CycleReport, CycleError> {
        info!("starting monitor run");

        let mut ledger = CooldownLedger::new();
        if let Err(e) = ledger.load(self.store.as_ref()).await {
            warn!("could not load ledger, continuing without cooldowns: {e}");
        }

        debug!("fetching measurement catalog");
        let catalog = self
            .source
            .get_catalog(&self.sampling_feature_code)
            .await
            .map_err(CycleError::CatalogFetch)?;
        info!("found {} measurements, processing", catalog.len());

        let mut report = CycleReport::default();
        for measurement in Measurement::ALL {
            let name = measurement.name();
            let Some(series_id) = catalog.get(name) else {
                debug!("{name}: not offered by this site");
                continue;
            };

            report.attempted += 1;
            let now = self.evaluator.now();
            match self
                .process(&mut ledger, name, series_id, now, &mut report)
                .await
            {
                Ok(()) => report.succeeded += 1,
                Err(e) => error!("error processing {name}: {e}"),
            }
        }

        info!(
            "successfully processed {}/{} measurements",
            report.succeeded, report.attempted
        );

        if let Err(e) = ledger.save(self.store.as_ref()).await {
            warn!("could not save ledger: {e}");
        }

        info!("monitor run completed: {report:?}");
        Ok(report)
    }

    async fn process(
        &self,
        ledger: &mut CooldownLedger,
        name: &str,
        series_id: &str,
        end: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> Result<(), SourceError> {
        let start = end
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let samples = self
            .source
            .get_recent_readings(series_id, start, end)
            .await?;
        debug!("{name}: {} samples in window", samples.len());

        for sample in samples {
            debug!("{name}: {:.2} at {}", sample.value, sample.observed_at);
            let outcome = self
                .evaluator
                .evaluate(ledger, name, sample.value, sample.observed_at)
                .await;
            report.evaluated += 1;
            report.record(outcome);
        }

        Ok(())
    }

    /// Run cycles forever, sleeping `interval` between them
    pub async fn run_forever(&self, interval: Duration) {
        loop {
            if let Err(e) = self.run_once().await {
                error!("error in monitoring cycle: {e}");
            }
            tokio::time::sleep(interval).await;
        }
    }
}
