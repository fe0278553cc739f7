use async_trait::async_trait;
use pictor_core::sanitize::slugify;
use pictor_core::{
    AttachmentPost, AttachmentRecord, PersistedImage, PipelineError, PipelineResult,
    RegistrationStage,
};
use serde_json::Value as JsonValue;
use std::path::Path;

/// External content store that owns attachment records
///
/// Implementations report their own failures as `anyhow::Error`; the registration sequence
/// tags each failure with the stage it happened in.
#[async_trait]
pub trait ContentRegistrar: Send + Sync {
    /// Insert the attachment record, returning its id. An id of `0` means the insert failed.
    async fn insert_attachment(
        &self,
        post: &AttachmentPost,
        file: &Path,
        parent_id: u64,
    ) -> anyhow::Result<u64>;

    /// Derive metadata (sizes, exif, ...) for an inserted attachment
    async fn generate_metadata(&self, attachment_id: u64, file: &Path)
        -> anyhow::Result<JsonValue>;

    async fn update_metadata(&self, attachment_id: u64, metadata: &JsonValue)
        -> anyhow::Result<()>;

    /// Make the attachment the featured image of its parent
    async fn set_thumbnail(&self, parent_id: u64, attachment_id: u64) -> anyhow::Result<()>;
}

/// Validate a caller-supplied parent id. Zero and negative ids are rejected.
pub fn parse_parent_id(raw: i64) -> PipelineResult<u64> {
    if raw <= 0 {
        return Err(PipelineError::InvalidParent(format!(
            "parent id must be a positive integer, got {}",
            raw
        )));
    }
    Ok(raw as u64)
}

/// Run the registration sequence for a persisted image.
///
/// Steps: insert, generate metadata, update metadata and, when `as_thumbnail` is set,
/// set the parent's thumbnail. The first failing step aborts the sequence. Records created
/// by earlier steps are left in the store.
pub async fn register_attachment(
    image: &PersistedImage,
    registrar: &dyn ContentRegistrar,
    parent_id: u64,
    as_thumbnail: bool,
    title: Option<&str>,
) -> PipelineResult<AttachmentRecord> {
    let start = std::time::Instant::now();
    let full_path = image.full_path();
    let title = slugify(title.unwrap_or_else(|| image.named().only_name()));
    let post = AttachmentPost::new(image.image().mime(), title.clone());

    let attachment_id = registrar
        .insert_attachment(&post, full_path, parent_id)
        .await
        .map_err(|e| PipelineError::registration(RegistrationStage::Insert, e))?;
    if attachment_id == 0 {
        return Err(PipelineError::registration(
            RegistrationStage::Insert,
            "content store returned no attachment id",
        ));
    }

    let metadata = registrar
        .generate_metadata(attachment_id, full_path)
        .await
        .map_err(|e| PipelineError::registration(RegistrationStage::GenerateMetadata, e))?;

    registrar
        .update_metadata(attachment_id, &metadata)
        .await
        .map_err(|e| PipelineError::registration(RegistrationStage::UpdateMetadata, e))?;

    if as_thumbnail {
        registrar
            .set_thumbnail(parent_id, attachment_id)
            .await
            .map_err(|e| PipelineError::registration(RegistrationStage::SetThumbnail, e))?;
    }

    tracing::info!(
        attachment_id = attachment_id,
        parent_id = parent_id,
        is_thumbnail = as_thumbnail,
        path = %full_path.display(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Attachment registered"
    );

    Ok(AttachmentRecord {
        id: attachment_id,
        parent_id,
        title,
        metadata,
        is_thumbnail: as_thumbnail,
    })
}
