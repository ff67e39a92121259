//! In-memory blob store (no persistence)
//!
//! Useful for:
//! - Testing without AWS or filesystem access
//! - Daemon mode without a configured backend (cooldowns survive between
//!   cycles but not restarts)

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::BlobStore;
use super::error::StorageResult;

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        debug!("in-memory store: get {key}");
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        debug!("in-memory store: put {key} ({} bytes)", bytes.len());
        self.blobs.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
