//! Attachment registered in an external content store

use serde::Serialize;

/// Fields of the content record inserted for an attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentPost {
    pub mime_type: String,
    pub title: String,
    pub content: String,
    pub status: String,
}

impl AttachmentPost {
    pub fn new(mime_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            title: title.into(),
            content: String::new(),
            status: "inherit".to_string(),
        }
    }
}

/// Handle returned once registration completed.
///
/// Created only after the file was persisted. The record itself lives in the external store
/// and is never removed by this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentRecord {
    pub id: u64,
    pub parent_id: u64,
    pub title: String,
    pub metadata: serde_json::Value,
    pub is_thumbnail: bool,
}
