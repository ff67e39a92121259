//! Failure tests for the monitoring cycle
//!
//! These tests verify that the system handles failures gracefully:
//! - Unreachable or broken data source
//! - Malformed payloads
//! - Failed notification delivery
//! - Broken state storage

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use watershed_monitor::{
    monitor::CycleError,
    storage::{BlobStore, StorageError, StorageResult, memory::MemoryBlobStore},
};
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

struct UnavailableStore;

#[async_trait]
impl BlobStore for UnavailableStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Err(StorageError::ReadFailed {
            key: key.to_string(),
            message: "service unavailable".to_string(),
        })
    }

    async fn put(&self, key: &str, _bytes: Vec<u8>) -> StorageResult<()> {
        Err(StorageError::WriteFailed {
            key: key.to_string(),
            message: "service unavailable".to_string(),
        })
    }

    fn describe(&self) -> String {
        "unavailable".to_string()
    }
}

#[tokio::test]
async fn test_catalog_server_error_fails_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("get_sampling_feature_metadata"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryBlobStore::new());
    let monitor = create_monitor(
        &server,
        store.clone(),
        Arc::new(RecordingNotifier::default()),
        ManualClock::starting_now(),
        default_resolver(),
    );

    assert_matches!(monitor.run_once().await, Err(CycleError::CatalogFetch(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_catalog_single_encoded_payload_fails_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"[{"variablenamecv":"Temperature","resultid":1}]"#),
        )
        .mount(&server)
        .await;

    let monitor = create_monitor(
        &server,
        Arc::new(MemoryBlobStore::new()),
        Arc::new(RecordingNotifier::default()),
        ManualClock::starting_now(),
        default_resolver(),
    );

    assert_matches!(monitor.run_once().await, Err(CycleError::CatalogFetch(_)));
}

#[tokio::test]
async fn test_malformed_series_skips_only_that_measurement() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Temperature", 1), ("Relative humidity", 2)]).await;
    Mock::given(method("POST"))
        .and(body_string_contains("%22resultid%22%3A%221%22"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"{not json\""))
        .mount(&server)
        .await;
    mount_series(&server, 2, &[100.5]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = create_monitor(
        &server,
        Arc::new(MemoryBlobStore::new()),
        notifier.clone(),
        ManualClock::starting_now(),
        default_resolver(),
    );

    let report = monitor.run_once().await.unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(notifier.sent_subjects(), vec!["Relative humidity Alert"]);
}

#[tokio::test]
async fn test_failed_delivery_retries_next_cycle() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Battery voltage", 4)]).await;
    mount_series(&server, 4, &[5.5]).await;

    let store = Arc::new(MemoryBlobStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    notifier.set_failing(true);
    let clock = ManualClock::starting_now();
    let monitor = create_monitor(
        &server,
        store.clone(),
        notifier.clone(),
        clock.clone(),
        default_resolver(),
    );

    let first = monitor.run_once().await.unwrap();
    assert_eq!(first.send_failed, 1);
    assert!(store.is_empty().await, "failed sends must not be recorded");

    clock.advance(chrono::Duration::minutes(5));
    let second = monitor.run_once().await.unwrap();
    assert_eq!(second.send_failed, 1);
    assert_eq!(second.suppressed, 0);

    notifier.set_failing(false);
    clock.advance(chrono::Duration::minutes(5));
    let third = monitor.run_once().await.unwrap();
    assert_eq!(third.sent, 1);
    assert_eq!(notifier.sent_subjects(), vec!["Battery voltage Alert"]);
}

#[tokio::test]
async fn test_unavailable_store_does_not_block_alerts() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Temperature", 1)]).await;
    mount_series(&server, 1, &[-25.0]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = create_monitor(
        &server,
        Arc::new(UnavailableStore),
        notifier.clone(),
        ManualClock::starting_now(),
        default_resolver(),
    );

    let report = monitor.run_once().await.unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(notifier.sent_subjects(), vec!["Temperature Alert"]);
}

#[tokio::test]
async fn test_site_without_tracked_measurements() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[("Dissolved oxygen", 1), ("pH", 2)]).await;

    let monitor = create_monitor(
        &server,
        Arc::new(MemoryBlobStore::new()),
        Arc::new(RecordingNotifier::default()),
        ManualClock::starting_now(),
        default_resolver(),
    );

    let report = monitor.run_once().await.unwrap();

    assert_eq!(report.attempted, 0);
    assert_eq!(report.succeeded, 0);
}
