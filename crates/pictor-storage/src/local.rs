use crate::traits::{StorageError, StorageResult, UploadDirProvider};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem upload directories
///
/// The default directory is `base` or, with dated subdirectories enabled, `base/YYYY/MM`
/// for the current month.
#[derive(Clone, Debug)]
pub struct LocalUploadDirs {
    base_path: PathBuf,
    dated_subdirs: bool,
}

impl LocalUploadDirs {
    /// Create a new LocalUploadDirs instance
    ///
    /// # Arguments
    /// * `base_path` - Root upload directory (e.g., "/var/lib/pictor/uploads")
    /// * `dated_subdirs` - Whether the default directory gets a `YYYY/MM` suffix
    pub fn new(base_path: impl Into<PathBuf>, dated_subdirs: bool) -> Self {
        Self {
            base_path: base_path.into(),
            dated_subdirs,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn dated_path(&self, now: DateTime<Utc>) -> PathBuf {
        if self.dated_subdirs {
            self.base_path
                .join(format!("{:04}", now.year()))
                .join(format!("{:02}", now.month()))
        } else {
            self.base_path.clone()
        }
    }
}

#[async_trait]
impl UploadDirProvider for LocalUploadDirs {
    async fn default_upload_dir(&self) -> StorageResult<PathBuf> {
        if self.base_path.as_os_str().is_empty() {
            return Err(StorageError::ConfigError(
                "Upload base directory is empty".to_string(),
            ));
        }
        Ok(self.dated_path(Utc::now()))
    }

    async fn ensure_dir(&self, path: &Path) -> StorageResult<()> {
        let start = std::time::Instant::now();

        fs::create_dir_all(path).await?;

        tracing::debug!(
            path = %path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload directory ready"
        );

        Ok(())
    }
}
