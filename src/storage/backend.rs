//! Blob store trait definition
//!
//! This module defines the `BlobStore` trait that all state stores
//! implement.

use async_trait::async_trait;

use super::error::StorageResult;

/// Key/value store for small opaque blobs
///
/// The monitor keeps exactly one blob in here (the cooldown ledger
/// snapshot), so implementations only need whole-object reads and writes.
///
/// ## Consistency
///
/// Writes are last-writer-wins. There is no versioning or compare-and-swap,
/// so two invocations racing on the same key may lose one of the updates.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the blob stored under `key`
    ///
    /// An absent key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store `bytes` under `key`, replacing any previous blob
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()>;

    /// Human-readable description for log lines (e.g. "s3://bucket")
    fn describe(&self) -> String;
}
