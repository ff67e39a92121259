//! Cooldown ledger - when each measurement last produced a delivered alert
//!
//! ```text
//! load(store) ──► get/set during evaluation ──► save(store)
//!   absent blob   → empty ledger
//!   corrupt blob  → error, contents untouched
//!   empty ledger  → save skips the write
//! ```
//!
//! Entries are only ever overwritten with a newer delivery time.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument};

use crate::storage::{BlobStore, StorageError};

/// Fixed key of the ledger snapshot inside the blob store.
pub const LEDGER_KEY: &str = "last_email_times.json";

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("could not load ledger: {0}")]
    Load(#[source] StorageError),

    #[error("ledger snapshot is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("could not encode ledger: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not save ledger: {0}")]
    Save(#[source] StorageError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CooldownLedger {
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<DateTime<Utc>> {
        self.entries.get(name).copied()
    }

    pub fn set(&mut self, name: &str, sent_at: DateTime<Utc>) {
        self.entries.insert(name.to_string(), sent_at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time elapsed since the last alert for `name`, if that alert is still
    /// inside `window`.
    pub fn is_cooling_down(
        &self,
        name: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Option<Duration> {
        let last = self.get(name)?;
        let elapsed = now - last;
        (elapsed < window).then_some(elapsed)
    }

    /// Replace the contents with the snapshot held in `store`.
    #[instrument(skip_all, fields(store = %store.describe()))]
    pub async fn load(&mut self, store: &dyn BlobStore) -> Result<(), LedgerError> {
        let Some(bytes) = store.get(LEDGER_KEY).await.map_err(LedgerError::Load)? else {
            info!("no existing ledger found, starting fresh");
            self.entries.clear();
            return Ok(());
        };

        let entries: BTreeMap<String, DateTime<Utc>> =
            serde_json::from_slice(&bytes).map_err(LedgerError::Malformed)?;
        self.entries = entries;

        for (name, at) in &self.entries {
            debug!("{name}: last alert sent at {at}");
        }
        info!("loaded ledger with {} entries", self.entries.len());

        Ok(())
    }

    /// Persist the contents to `store`. Returns whether a write happened.
    ///
    /// An empty ledger is never written; the stored snapshot stays as it is.
    #[instrument(skip_all, fields(store = %store.describe()))]
    pub async fn save(&self, store: &dyn BlobStore) -> Result<bool, LedgerError> {
        if self.entries.is_empty() {
            debug!("ledger is empty, nothing to save");
            return Ok(false);
        }

        let bytes = serde_json::to_vec(&self.entries).map_err(LedgerError::Encode)?;
        store
            .put(LEDGER_KEY, bytes)
            .await
            .map_err(LedgerError::Save)?;
        info!("saved ledger with {} entries", self.entries.len());

        Ok(true)
    }
}
