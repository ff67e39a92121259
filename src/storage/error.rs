//! Error types for blob store operations

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing blobs
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading a blob failed for a reason other than it being absent
    #[error("failed to read blob '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Writing a blob failed
    #[error("failed to write blob '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Invalid configuration
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (file access, etc.)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
