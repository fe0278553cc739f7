//! Collaborator traits
//!
//! The ingest pipeline never reaches for ambient globals: the upload directory and the
//! remote byte source are injected through these traits.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Remote body too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Source of upload directories
#[async_trait]
pub trait UploadDirProvider: Send + Sync {
    /// Directory used when the caller does not choose one. It may not exist yet.
    async fn default_upload_dir(&self) -> StorageResult<PathBuf>;

    /// Create `path` and any missing parents.
    ///
    /// Succeeds when the directory already exists, so concurrent runs targeting the same
    /// directory may all call it.
    async fn ensure_dir(&self, path: &Path) -> StorageResult<()>;
}

/// Retrieves the raw bytes behind a URL
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> StorageResult<Bytes>;
}
