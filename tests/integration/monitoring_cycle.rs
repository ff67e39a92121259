//! End-to-end cycles against a mocked watershed API
//!
//! These tests verify that:
//! - Out-of-range readings produce exactly one alert per cooldown window
//! - The persisted ledger makes consecutive invocations behave like one loop
//! - Threshold overrides are honoured

use std::sync::Arc;

use pretty_assertions::assert_eq;
use watershed_monitor::{
    ledger::{CooldownLedger, LEDGER_KEY},
    storage::{BlobStore, file::FileBlobStore, memory::MemoryBlobStore},
    threshold::ThresholdResolver,
};
use wiremock::MockServer;

use crate::helpers::*;

#[tokio::test]
async fn test_repeated_runs_send_single_alert() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Temperature", 31), ("Turbidity", 32)]).await;
    mount_series(&server, 31, &[27.0]).await;
    mount_series(&server, 32, &[12.0]).await;

    let store = Arc::new(MemoryBlobStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = ManualClock::starting_now();

    let monitor = create_monitor(
        &server,
        store.clone(),
        notifier.clone(),
        clock.clone(),
        default_resolver(),
    );

    let first = monitor.run_once().await.unwrap();
    assert_eq!(first.attempted, 2);
    assert_eq!(first.succeeded, 2);
    assert_eq!(first.sent, 1);

    clock.advance(chrono::Duration::minutes(5));
    let second = monitor.run_once().await.unwrap();
    assert_eq!(second.sent, 0);
    assert_eq!(second.suppressed, 1);

    assert_eq!(notifier.sent_subjects(), vec!["Temperature Alert"]);
}

#[tokio::test]
async fn test_fresh_process_honours_persisted_cooldown() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Water depth", 7)]).await;
    mount_series(&server, 7, &[1500.0]).await;

    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = ManualClock::starting_now();

    // Two monitors sharing nothing but the state directory, like two
    // serverless invocations.
    for _ in 0..2 {
        let store = Arc::new(FileBlobStore::new(dir.path()));
        let monitor = create_monitor(
            &server,
            store,
            notifier.clone(),
            clock.clone(),
            default_resolver(),
        );
        monitor.run_once().await.unwrap();
        clock.advance(chrono::Duration::hours(1));
    }

    assert_eq!(notifier.sent_subjects(), vec!["Water depth Alert"]);

    let mut ledger = CooldownLedger::new();
    ledger.load(&FileBlobStore::new(dir.path())).await.unwrap();
    assert!(ledger.get("Water depth").is_some());
}

#[tokio::test]
async fn test_alert_fires_again_after_cooldown() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Electrical conductivity", 5)]).await;
    mount_series(&server, 5, &[750.0]).await;

    let store = Arc::new(MemoryBlobStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = ManualClock::starting_now();
    let monitor = create_monitor(
        &server,
        store,
        notifier.clone(),
        clock.clone(),
        default_resolver(),
    );

    monitor.run_once().await.unwrap();
    clock.advance(chrono::Duration::hours(11));
    monitor.run_once().await.unwrap();
    clock.advance(chrono::Duration::hours(2));
    monitor.run_once().await.unwrap();

    assert_eq!(notifier.sent.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_alert_body_names_range() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Percent full scale", 3)]).await;
    mount_series(&server, 3, &[101.0]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = create_monitor(
        &server,
        Arc::new(MemoryBlobStore::new()),
        notifier.clone(),
        ManualClock::starting_now(),
        default_resolver(),
    );
    monitor.run_once().await.unwrap();

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, RECIPIENT);
    assert!(sent[0].body.starts_with("Percent full scale has reached 101.00 at "));
    assert!(sent[0].body.contains(" EST\n"));
    assert!(sent[0].body.ends_with("(Acceptable range: 0.00 to 101.00)"));
}

#[tokio::test]
async fn test_override_keeps_reading_in_range() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Turbidity", 11)]).await;
    mount_series(&server, 11, &[180.0]).await;

    let store = Arc::new(MemoryBlobStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = create_monitor(
        &server,
        store.clone(),
        notifier.clone(),
        ManualClock::starting_now(),
        ThresholdResolver::with_overrides([("TURBIDITY_MAX", "200")]),
    );

    let report = monitor.run_once().await.unwrap();

    assert_eq!(report.evaluated, 1);
    assert_eq!(report.sent, 0);
    assert!(notifier.sent.lock().unwrap().is_empty());
    // nothing alerted, so nothing persisted
    assert_eq!(store.get(LEDGER_KEY).await.unwrap(), None);
}
