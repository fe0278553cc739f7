//! Path resolver
//!
//! Produces an absolute, existing upload directory. Joining the canonical name onto it
//! happens in [`PersistedImage::new`](pictor_core::PersistedImage::new).

use pictor_core::{PipelineError, PipelineResult};
use pictor_storage::{StorageError, UploadDirProvider};
use std::io;
use std::path::{Path, PathBuf};

/// Resolve the upload directory.
///
/// An explicit directory must already exist (`InvalidDirectory` otherwise). Without one the
/// provider's default directory is used. Either way the directory is ensured, which is
/// idempotent; a failure to create it is returned as `DirectoryCreate` and not retried.
pub async fn resolve_upload_dir(
    dirs: &dyn UploadDirProvider,
    explicit: Option<&Path>,
) -> PipelineResult<PathBuf> {
    let dir = match explicit {
        Some(path) => {
            let resolved = tokio::fs::canonicalize(path)
                .await
                .map_err(|_| PipelineError::InvalidDirectory(path.to_path_buf()))?;
            let is_dir = tokio::fs::metadata(&resolved)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if !is_dir {
                return Err(PipelineError::InvalidDirectory(path.to_path_buf()));
            }
            resolved
        }
        None => dirs
            .default_upload_dir()
            .await
            .map_err(|e| directory_create(PathBuf::new(), e))?,
    };

    dirs.ensure_dir(&dir)
        .await
        .map_err(|e| directory_create(dir.clone(), e))?;

    // The default directory may be relative until it exists
    let dir = tokio::fs::canonicalize(&dir)
        .await
        .map_err(|source| PipelineError::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;

    tracing::debug!(upload_dir = %dir.display(), "Upload directory resolved");
    Ok(dir)
}

fn directory_create(path: PathBuf, err: StorageError) -> PipelineError {
    let source = match err {
        StorageError::IoError(e) => e,
        other => io::Error::other(other.to_string()),
    };
    PipelineError::DirectoryCreate { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_storage::LocalUploadDirs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_explicit_directory_must_exist() {
        let base = tempdir().unwrap();
        let dirs = LocalUploadDirs::new(base.path(), false);
        let missing = base.path().join("missing");

        let result = resolve_upload_dir(&dirs, Some(&missing)).await;
        assert!(matches!(result, Err(PipelineError::InvalidDirectory(p)) if p == missing));
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_explicit_file_is_not_a_directory() {
        let base = tempdir().unwrap();
        let file = base.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let dirs = LocalUploadDirs::new(base.path(), false);

        let result = resolve_upload_dir(&dirs, Some(&file)).await;
        assert!(matches!(result, Err(PipelineError::InvalidDirectory(_))));
    }

    #[tokio::test]
    async fn test_explicit_directory_is_canonicalized() {
        let base = tempdir().unwrap();
        std::fs::create_dir(base.path().join("a")).unwrap();
        let dirs = LocalUploadDirs::new(base.path(), false);
        let dotted = base.path().join("a").join("..").join("a");

        let resolved = resolve_upload_dir(&dirs, Some(&dotted)).await.unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, std::fs::canonicalize(base.path().join("a")).unwrap());
    }

    #[tokio::test]
    async fn test_default_directory_created_and_stable() {
        let base = tempdir().unwrap();
        let dirs = LocalUploadDirs::new(base.path().join("uploads"), true);

        let first = resolve_upload_dir(&dirs, None).await.unwrap();
        let second = resolve_upload_dir(&dirs, None).await.unwrap();
        assert!(first.is_dir());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_default_directory_create_failure() {
        let base = tempdir().unwrap();
        let file = base.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let dirs = LocalUploadDirs::new(&file, true);

        let result = resolve_upload_dir(&dirs, None).await;
        assert!(matches!(result, Err(PipelineError::DirectoryCreate { .. })));
    }
}
