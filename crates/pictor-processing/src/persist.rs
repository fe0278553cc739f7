//! Persistence operation
//!
//! Soft failures (the write, copy or rename itself failed) are `Ok(false)`; the caller
//! decides whether to retry. `Err` is reserved for requests that can never succeed.

use pictor_core::{PersistedImage, PipelineError, PipelineResult};
use std::path::Path;

/// Write the image to its full path.
///
/// Remote images write the buffer fetched during validation (create or overwrite). Local
/// images are copied and the origin is left in place.
#[must_use = "save reports write failures as Ok(false)"]
pub async fn save(image: &PersistedImage) -> PipelineResult<bool> {
    let start = std::time::Instant::now();
    let source = image.image().source();
    let dest = image.full_path();

    let written = if source.is_url() {
        match image.image().buffer() {
            Some(buffer) => match tokio::fs::write(dest, buffer).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %dest.display(),
                        "Failed to write fetched image"
                    );
                    false
                }
            },
            None => {
                tracing::warn!(
                    origin = %source.origin(),
                    "No fetched bytes to write; the buffer was already released"
                );
                false
            }
        }
    } else if same_file(Path::new(source.path()), dest).await {
        true
    } else {
        match tokio::fs::copy(source.path(), dest).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    from = %source.path(),
                    to = %dest.display(),
                    "Failed to copy image"
                );
                false
            }
        }
    };

    if written {
        tracing::info!(
            origin = %source.origin(),
            path = %dest.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image saved"
        );
    }

    Ok(written)
}

/// Move a local image to its full path.
///
/// Fails with `OperationNotSupported` for remote images whatever the rest of the state.
/// Falls back to copy and remove when a rename is not possible (e.g. across filesystems).
#[must_use = "move_file reports filesystem failures as Ok(false)"]
pub async fn move_file(image: &PersistedImage) -> PipelineResult<bool> {
    let source = image.image().source();
    if source.is_url() {
        return Err(PipelineError::OperationNotSupported(format!(
            "cannot move remote origin {}",
            source.origin()
        )));
    }

    let from = Path::new(source.path());
    let dest = image.full_path();
    if same_file(from, dest).await {
        return Ok(true);
    }

    if let Err(e) = tokio::fs::rename(from, dest).await {
        tracing::debug!(error = %e, "Rename failed, falling back to copy and remove");

        if let Err(e) = tokio::fs::copy(from, dest).await {
            tracing::warn!(
                error = %e,
                from = %from.display(),
                to = %dest.display(),
                "Failed to move image"
            );
            return Ok(false);
        }
        if let Err(e) = tokio::fs::remove_file(from).await {
            tracing::warn!(
                error = %e,
                from = %from.display(),
                "Copied image but could not remove origin"
            );
            return Ok(false);
        }
    }

    tracing::info!(from = %from.display(), to = %dest.display(), "Image moved");
    Ok(true)
}

// Copying a file onto itself would truncate it.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pictor_core::{ImageSource, NamedImage, SourceKind, ValidatedImage};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn local(origin: &Path, dir: &Path, only_name: &str) -> PersistedImage {
        let origin = origin.to_str().unwrap();
        let source = ImageSource::new(origin, SourceKind::Local, "beach.png", origin);
        let validated = ValidatedImage::new(source, "image/png", "png", Some(3), None, None);
        PersistedImage::new(NamedImage::new(validated, only_name), dir)
    }

    fn remote(dir: &Path, buffer: Option<Bytes>) -> PersistedImage {
        let url = "https://example.com/beach.png";
        let source = ImageSource::new(url, SourceKind::Remote, "beach.png", url);
        let validated = ValidatedImage::new(source, "image/png", "png", None, None, buffer);
        PersistedImage::new(NamedImage::new(validated, "beach"), dir)
    }

    #[tokio::test]
    async fn test_save_local_copies() {
        let dir = tempdir().unwrap();
        let origin = dir.path().join("origin.png");
        std::fs::write(&origin, b"abc").unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let image = local(&origin, &out, "beach");
        assert!(save(&image).await.unwrap());
        assert_eq!(std::fs::read(image.full_path()).unwrap(), b"abc");
        assert!(origin.exists());
    }

    #[tokio::test]
    async fn test_save_onto_itself_keeps_content() {
        let dir = tempdir().unwrap();
        let origin = dir.path().join("beach.png");
        std::fs::write(&origin, b"abc").unwrap();

        let image = local(&origin, dir.path(), "beach");
        assert!(save(&image).await.unwrap());
        assert_eq!(std::fs::read(&origin).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_save_remote_overwrites() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("beach.png"), b"older and longer").unwrap();

        let image = remote(dir.path(), Some(Bytes::from_static(b"new")));
        assert!(save(&image).await.unwrap());
        assert_eq!(std::fs::read(image.full_path()).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_save_soft_failures() {
        let dir = tempdir().unwrap();
        let missing_dir = PathBuf::from(dir.path()).join("gone");

        let image = remote(&missing_dir, Some(Bytes::from_static(b"x")));
        assert!(!save(&image).await.unwrap());

        let released = remote(dir.path(), None);
        assert!(!save(&released).await.unwrap());
    }

    #[tokio::test]
    async fn test_move_local() {
        let dir = tempdir().unwrap();
        let origin = dir.path().join("origin.png");
        std::fs::write(&origin, b"abc").unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let image = local(&origin, &out, "moved");
        assert!(move_file(&image).await.unwrap());
        assert!(!origin.exists());
        assert_eq!(std::fs::read(out.join("moved.png")).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_move_missing_origin_is_soft_failure() {
        let dir = tempdir().unwrap();
        let image = local(&dir.path().join("gone.png"), dir.path(), "beach");
        assert!(!move_file(&image).await.unwrap());
    }

    #[tokio::test]
    async fn test_move_remote_not_supported() {
        let dir = tempdir().unwrap();
        let image = remote(dir.path(), Some(Bytes::from_static(b"x")));
        assert!(matches!(
            move_file(&image).await,
            Err(PipelineError::OperationNotSupported(_))
        ));
    }
}
