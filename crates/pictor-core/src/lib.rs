//! Pictor Core Library
//!
//! This crate provides the error taxonomy, configuration and domain models (mime policy,
//! pipeline stage values, attachment record) shared by all Pictor crates.

pub mod config;
pub mod error;
pub mod models;
pub mod sanitize;

// Re-export commonly used types
pub use config::{IngestConfig, LogFormat, SniffStrategy};
pub use error::{ErrorMetadata, LogLevel, PipelineError, PipelineResult, RegistrationStage};
pub use models::{
    AttachmentPost, AttachmentRecord, Dimensions, ImageSource, MimeExtensionPolicy,
    MimeRestriction, NamedImage, PersistedImage, SourceKind, ValidatedImage,
};
