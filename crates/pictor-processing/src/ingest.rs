//! Ingest state machine
//!
//! [`ImageIngest`] owns one image through the pipeline. Construction runs location and
//! validation and fails without producing a value; afterwards the image is either named
//! (no directory yet) or placed (full path known). Saving or moving marks it persisted, after
//! which renaming and relocation are rejected.

use crate::locator::locate;
use crate::naming::{name_image, resolve_only_name};
use crate::path::resolve_upload_dir;
use crate::persist;
use crate::validator::ImageValidator;
use pictor_attach::{parse_parent_id, register_attachment, ContentRegistrar};
use pictor_core::{
    AttachmentRecord, IngestConfig, NamedImage, PersistedImage, PipelineError, PipelineResult,
    SniffStrategy, ValidatedImage,
};
use pictor_storage::{
    create_fetcher, create_upload_dirs, RemoteFetcher, StorageResult, UploadDirProvider,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Options for [`ImageIngest::construct`]
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Restrict validation to one mime type of the policy table
    pub mime: Option<String>,
    /// Slugify the derived name
    pub sanitize: bool,
    pub strategy: SniffStrategy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            mime: None,
            sanitize: true,
            strategy: SniffStrategy::default(),
        }
    }
}

/// Injected filesystem and network collaborators
#[derive(Clone)]
pub struct Collaborators {
    pub dirs: Arc<dyn UploadDirProvider>,
    /// Required for remote origins only
    pub fetcher: Option<Arc<dyn RemoteFetcher>>,
}

impl Collaborators {
    pub fn from_config(config: &IngestConfig) -> StorageResult<Self> {
        Ok(Self {
            dirs: create_upload_dirs(config),
            fetcher: Some(create_fetcher(config)?),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Stage {
    Named(NamedImage),
    Placed(PersistedImage),
}

impl Stage {
    fn named(&self) -> &NamedImage {
        match self {
            Stage::Named(named) => named,
            Stage::Placed(placed) => placed.named(),
        }
    }

    fn placed(&self) -> Option<&PersistedImage> {
        match self {
            Stage::Placed(placed) => Some(placed),
            Stage::Named(_) => None,
        }
    }
}

/// One image moving through the ingest pipeline
#[derive(Serialize)]
pub struct ImageIngest {
    #[serde(flatten)]
    stage: Stage,
    persisted: bool,
    attachment: Option<AttachmentRecord>,
    #[serde(skip)]
    dirs: Arc<dyn UploadDirProvider>,
}

impl ImageIngest {
    /// Locate and validate `origin`, then derive its canonical name.
    ///
    /// The mime restriction is checked first, so an unknown restriction fails before the
    /// origin is touched.
    #[tracing::instrument(
        skip(options, collaborators),
        fields(mime = ?options.mime, strategy = %options.strategy)
    )]
    pub async fn construct(
        origin: &str,
        options: IngestOptions,
        collaborators: Collaborators,
    ) -> PipelineResult<Self> {
        let validator = ImageValidator::new(
            options.mime.as_deref(),
            options.strategy,
            collaborators.fetcher.clone(),
        )?;
        let source = locate(origin).await?;
        let validated = validator.validate(source).await?;
        let named = name_image(validated, None, options.sanitize)?;

        tracing::info!(
            origin = %origin,
            mime = %named.image().mime(),
            name = %named.name(),
            "Image accepted"
        );

        Ok(Self {
            stage: Stage::Named(named),
            persisted: false,
            attachment: None,
            dirs: collaborators.dirs,
        })
    }

    /// Choose the upload directory (`None` for the provider default) and compute the full path.
    pub async fn set_upload_directory(&mut self, path: Option<&Path>) -> PipelineResult<()> {
        self.ensure_not_persisted("change the upload directory")?;
        let dir = resolve_upload_dir(self.dirs.as_ref(), path).await?;
        let named = self.stage.named().clone();
        self.stage = Stage::Placed(PersistedImage::new(named, dir));
        Ok(())
    }

    /// Rename the image (`None` re-derives the name from the origin). Keeps the directory.
    pub fn set_name(&mut self, name: Option<&str>, sanitize: bool) -> PipelineResult<()> {
        self.ensure_not_persisted("rename")?;
        let only_name = resolve_only_name(self.stage.named().image(), name, sanitize)?;

        self.stage = match &self.stage {
            Stage::Named(named) => Stage::Named(named.clone().renamed(only_name)),
            Stage::Placed(placed) => Stage::Placed(PersistedImage::new(
                placed.named().clone().renamed(only_name),
                placed.upload_dir(),
            )),
        };
        Ok(())
    }

    /// Full path, resolving the default upload directory on first use.
    ///
    /// Memoized: later calls return the same path until the directory or name changes.
    pub async fn resolve_full_path(&mut self) -> PipelineResult<&Path> {
        Ok(self.placed().await?.full_path())
    }

    /// Copy (local) or write (remote) the image to its full path.
    ///
    /// `Ok(false)` means the write itself failed and the image is not persisted. A successful
    /// remote save releases the fetched buffer.
    #[must_use = "save reports write failures as Ok(false)"]
    pub async fn save(&mut self) -> PipelineResult<bool> {
        let saved = persist::save(self.placed().await?).await?;
        if saved {
            self.persisted = true;
            if let Stage::Placed(placed) = &mut self.stage {
                placed.release_buffer();
            }
        }
        Ok(saved)
    }

    /// Move a local origin to its full path. Remote origins fail with `OperationNotSupported`.
    #[must_use = "move_file reports filesystem failures as Ok(false)"]
    pub async fn move_file(&mut self) -> PipelineResult<bool> {
        if self.is_url() {
            return Err(PipelineError::OperationNotSupported(format!(
                "cannot move remote origin {}",
                self.origin()
            )));
        }
        let moved = persist::move_file(self.placed().await?).await?;
        if moved {
            self.persisted = true;
        }
        Ok(moved)
    }

    /// Register the image as an attachment of `parent_id`.
    ///
    /// The parent id is checked before anything else. Resolves the full path if needed but
    /// does not require the file to have been saved.
    pub async fn register_attachment(
        &mut self,
        registrar: &dyn ContentRegistrar,
        parent_id: i64,
        as_thumbnail: bool,
        title: Option<&str>,
    ) -> PipelineResult<&AttachmentRecord> {
        let parent_id = parse_parent_id(parent_id)?;
        let record =
            register_attachment(self.placed().await?, registrar, parent_id, as_thumbnail, title)
                .await?;
        Ok(self.attachment.insert(record))
    }

    async fn placed(&mut self) -> PipelineResult<&PersistedImage> {
        if self.stage.placed().is_none() {
            self.set_upload_directory(None).await?;
        }
        self.stage
            .placed()
            .ok_or_else(|| PipelineError::InvalidDirectory(Default::default()))
    }

    fn ensure_not_persisted(&self, action: &str) -> PipelineResult<()> {
        if self.persisted {
            return Err(PipelineError::OperationNotSupported(format!(
                "cannot {} after the image was persisted",
                action
            )));
        }
        Ok(())
    }

    fn image(&self) -> &ValidatedImage {
        self.stage.named().image()
    }

    pub fn origin(&self) -> &str {
        self.image().source().origin()
    }

    pub fn is_url(&self) -> bool {
        self.image().source().is_url()
    }

    pub fn origin_basename(&self) -> &str {
        self.image().source().basename()
    }

    pub fn origin_path(&self) -> &str {
        self.image().source().path()
    }

    pub fn mime(&self) -> &str {
        self.image().mime()
    }

    pub fn extension(&self) -> &str {
        self.image().extension()
    }

    /// Byte size of a local origin
    pub fn size(&self) -> Option<u64> {
        self.image().size()
    }

    /// Pixel width, only when the header strategy ran
    pub fn width(&self) -> Option<u32> {
        self.image().width()
    }

    pub fn height(&self) -> Option<u32> {
        self.image().height()
    }

    pub fn has_buffer(&self) -> bool {
        self.image().buffer().is_some()
    }

    pub fn only_name(&self) -> &str {
        self.stage.named().only_name()
    }

    pub fn name(&self) -> &str {
        self.stage.named().name()
    }

    pub fn upload_dir(&self) -> Option<&Path> {
        self.stage.placed().map(|placed| placed.upload_dir())
    }

    /// Full path, if the upload directory has been resolved
    pub fn full_path(&self) -> Option<&Path> {
        self.stage.placed().map(|placed| placed.full_path())
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn attachment(&self) -> Option<&AttachmentRecord> {
        self.attachment.as_ref()
    }

    pub fn is_thumbnail(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| a.is_thumbnail)
    }
}
