//! Blob stores for the persisted cooldown ledger
//!
//! This module provides a trait-based abstraction over the place where the
//! ledger snapshot lives between invocations.
//!
//! ## Backends
//!
//! - **S3** (default, feature `aws`): survives serverless cold starts
//! - **File**: a local directory, for daemons on a single host
//! - **In-Memory**: no persistence, for testing or a daemon without state
//!
//! ## Usage
//!
//! ```no_run
//! use watershed_monitor::storage::{BlobStore, file::FileBlobStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = FileBlobStore::new("./state");
//!     let blob = store.get("last_email_times.json").await?;
//!     println!("stored: {}", blob.is_some());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
#[cfg(feature = "aws")]
pub mod s3;

pub use backend::BlobStore;
pub use error::{StorageError, StorageResult};
