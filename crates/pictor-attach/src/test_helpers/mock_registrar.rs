use crate::registrar::ContentRegistrar;
use anyhow::Result;
use async_trait::async_trait;
use pictor_core::{AttachmentPost, RegistrationStage};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Attachment as seen by the mock store
#[derive(Clone, Debug)]
pub struct StoredAttachment {
    pub post: AttachmentPost,
    pub file: PathBuf,
    pub parent_id: u64,
    pub metadata: Option<JsonValue>,
}

/// Mock content store
///
/// Ids are handed out sequentially from 1. Can be told to fail at one stage or to return
/// an id of zero from the insert.
#[derive(Clone, Default)]
pub struct MockRegistrar {
    attachments: Arc<Mutex<HashMap<u64, StoredAttachment>>>,
    thumbnails: Arc<Mutex<HashMap<u64, u64>>>,
    next_id: Arc<Mutex<u64>>,
    fail_at: Option<RegistrationStage>,
    zero_id: bool,
}

impl MockRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(mut self, stage: RegistrationStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn returning_zero_id(mut self) -> Self {
        self.zero_id = true;
        self
    }

    pub fn attachment(&self, id: u64) -> Option<StoredAttachment> {
        self.attachments.lock().unwrap().get(&id).cloned()
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.lock().unwrap().len()
    }

    pub fn thumbnail_of(&self, parent_id: u64) -> Option<u64> {
        self.thumbnails.lock().unwrap().get(&parent_id).copied()
    }

    fn check(&self, stage: RegistrationStage) -> Result<()> {
        if self.fail_at == Some(stage) {
            anyhow::bail!("mock {} failure", stage);
        }
        Ok(())
    }
}

#[async_trait]
impl ContentRegistrar for MockRegistrar {
    async fn insert_attachment(
        &self,
        post: &AttachmentPost,
        file: &Path,
        parent_id: u64,
    ) -> Result<u64> {
        self.check(RegistrationStage::Insert)?;
        if self.zero_id {
            return Ok(0);
        }

        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.attachments.lock().unwrap().insert(
            id,
            StoredAttachment {
                post: post.clone(),
                file: file.to_path_buf(),
                parent_id,
                metadata: None,
            },
        );
        Ok(id)
    }

    async fn generate_metadata(&self, attachment_id: u64, file: &Path) -> Result<JsonValue> {
        self.check(RegistrationStage::GenerateMetadata)?;
        Ok(json!({
            "attachment_id": attachment_id,
            "file": file.display().to_string(),
        }))
    }

    async fn update_metadata(&self, attachment_id: u64, metadata: &JsonValue) -> Result<()> {
        self.check(RegistrationStage::UpdateMetadata)?;
        let mut attachments = self.attachments.lock().unwrap();
        let stored = attachments
            .get_mut(&attachment_id)
            .ok_or_else(|| anyhow::anyhow!("attachment {} not found", attachment_id))?;
        stored.metadata = Some(metadata.clone());
        Ok(())
    }

    async fn set_thumbnail(&self, parent_id: u64, attachment_id: u64) -> Result<()> {
        self.check(RegistrationStage::SetThumbnail)?;
        self.thumbnails
            .lock()
            .unwrap()
            .insert(parent_id, attachment_id);
        Ok(())
    }
}
