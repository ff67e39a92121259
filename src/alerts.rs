//! Reading evaluation and the alert-cooldown state machine
//!
//! ```text
//! unknown name / value in [min, max) ──────────────► NotNeeded
//! out of range, last alert < cooldown ago ─────────► Suppressed
//! out of range, no recipient configured ───────────► Suppressed
//! out of range, otherwise ── send ── ok ──► ledger.set(now) ► Sent
//!                                  └── err ─────────────────► SendFailed
//! ```
//!
//! A failed delivery leaves the ledger untouched, so the next cycle tries
//! again without waiting out a cooldown.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use tracing::{error, info, instrument, warn};

use crate::clock::Clock;
use crate::ledger::CooldownLedger;
use crate::notify::{Notification, Notifier};
use crate::threshold::{Threshold, ThresholdResolver};

/// Minimum time between two delivered alerts for the same measurement.
pub const DEFAULT_COOLDOWN_HOURS: i64 = 12;

/// Offset used to render observation times in alert bodies.
const EST_OFFSET_SECS: i32 = 5 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    NotNeeded,
    Suppressed,
    Sent,
    SendFailed,
}

/// Why an out-of-range reading did not lead to a delivery attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuppressReason {
    /// A previous alert was delivered this long ago
    Cooldown { elapsed: Duration },
    NoRecipient,
}

/// Decision reached before any side effect happens
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    NotNeeded,
    Suppressed(SuppressReason),
    Notify {
        threshold: Threshold,
        recipient: String,
    },
}

pub struct ReadingEvaluator {
    resolver: ThresholdResolver,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    recipient: Option<String>,
    cooldown: Duration,
}

impl ReadingEvaluator {
    pub fn new(
        resolver: ThresholdResolver,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        recipient: Option<String>,
    ) -> Self {
        Self {
            resolver,
            notifier,
            clock,
            recipient,
            cooldown: Duration::hours(DEFAULT_COOLDOWN_HOURS),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Current time according to the evaluator's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Decide what to do with a reading without touching anything.
    pub fn assess(
        &self,
        ledger: &CooldownLedger,
        name: &str,
        value: f64,
        now: DateTime<Utc>,
    ) -> Assessment {
        let Some(threshold) = self.resolver.resolve(name) else {
            return Assessment::NotNeeded;
        };

        if threshold.contains(value) {
            return Assessment::NotNeeded;
        }

        if let Some(elapsed) = ledger.is_cooling_down(name, now, self.cooldown) {
            return Assessment::Suppressed(SuppressReason::Cooldown { elapsed });
        }

        match &self.recipient {
            Some(recipient) => Assessment::Notify {
                threshold,
                recipient: recipient.clone(),
            },
            None => Assessment::Suppressed(SuppressReason::NoRecipient),
        }
    }

    #[instrument(skip(self, ledger))]
    pub async fn evaluate(
        &self,
        ledger: &mut CooldownLedger,
        name: &str,
        value: f64,
        observed_at: DateTime<Utc>,
    ) -> NotificationOutcome {
        let (threshold, recipient) = match self.assess(ledger, name, value, self.clock.now()) {
            Assessment::NotNeeded => return NotificationOutcome::NotNeeded,
            Assessment::Suppressed(reason) => {
                self.log_suppressed(name, value, reason);
                return NotificationOutcome::Suppressed;
            }
            Assessment::Notify {
                threshold,
                recipient,
            } => (threshold, recipient),
        };

        warn!(
            "ALERT: {name} value {value:.2} is outside acceptable range ({:.2} to {:.2})",
            threshold.min, threshold.max
        );

        let notification = Notification {
            recipient,
            subject: format_subject(name),
            body: format_body(name, value, observed_at, threshold),
        };

        if let Err(e) = self.notifier.send(&notification).await {
            error!("Error sending alert for {name}: {e}");
            return NotificationOutcome::SendFailed;
        }

        ledger.set(name, self.clock.now());
        info!("Alert sent for {name} (value: {value:.2})");
        NotificationOutcome::Sent
    }

    fn log_suppressed(&self, name: &str, value: f64, reason: SuppressReason) {
        match reason {
            SuppressReason::Cooldown { elapsed } => {
                let hours_since = elapsed.num_seconds() as f64 / 3600.0;
                let hours_left = self.cooldown.num_seconds() as f64 / 3600.0 - hours_since;
                info!(
                    "{name} value {value:.2} out of range, alert suppressed: previous alert was sent {hours_since:.1} hours ago (waiting {hours_left:.1} more hours)"
                );
            }
            SuppressReason::NoRecipient => {
                warn!(
                    "{name} value {value:.2} out of range, alert suppressed: no email recipient configured"
                );
            }
        }
    }
}

pub fn format_subject(name: &str) -> String {
    format!("{name} Alert")
}

pub fn format_body(
    name: &str,
    value: f64,
    observed_at: DateTime<Utc>,
    threshold: Threshold,
) -> String {
    format!(
        "{name} has reached {value:.2} at {}\n(Acceptable range: {:.2} to {:.2})",
        format_est(observed_at),
        threshold.min,
        threshold.max
    )
}

/// Render a timestamp at a fixed UTC-5 offset, labelled "EST".
///
/// Daylight saving time is not applied.
pub fn format_est(at: DateTime<Utc>) -> String {
    // west_opt only fails outside ±24h
    let offset = FixedOffset::west_opt(EST_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S EST")
        .to_string()
}
