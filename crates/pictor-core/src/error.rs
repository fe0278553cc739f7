//! Error types module
//!
//! Every failure the ingest pipeline can raise is a variant of [`PipelineError`].
//! Validation-stage variants abort construction of an image entirely; there is no
//! partially-valid instance. Persistence reports soft failures as `Ok(false)` and only
//! uses this type for hard failures (see `pictor_processing::persist`).

use std::io;
use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like network hiccups
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Self-description of an error so front ends can log and react without matching variants
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "INVALID_EXTENSION")
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same call may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the operator
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Stage of the attachment registration sequence that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStage {
    Insert,
    GenerateMetadata,
    UpdateMetadata,
    SetThumbnail,
}

impl std::fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStage::Insert => write!(f, "insert"),
            RegistrationStage::GenerateMetadata => write!(f, "generate metadata"),
            RegistrationStage::UpdateMetadata => write!(f, "update metadata"),
            RegistrationStage::SetThumbnail => write!(f, "set thumbnail"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid image source: {0}")]
    InvalidSource(String),

    #[error("Mime type not supported by policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid extension: '{extension}' (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid mime type: {detected} (allowed: {allowed:?})")]
    MimeMismatch {
        detected: String,
        allowed: Vec<String>,
    },

    #[error("Failed to read image bytes from {origin}: {message}")]
    Read { origin: String, message: String },

    #[error("Failed to decode image header from {origin}: {message}")]
    Decode { origin: String, message: String },

    #[error("Invalid upload directory: {0}")]
    InvalidDirectory(PathBuf),

    #[error("Failed to create upload directory {path}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid image name: {0}")]
    InvalidName(String),

    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),

    #[error("Invalid parent id: {0}")]
    InvalidParent(String),

    #[error("Attachment registration failed at {stage} stage: {message}")]
    AttachmentRegistration {
        stage: RegistrationStage,
        message: String,
    },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn pipeline_error_static_metadata(
    err: &PipelineError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        PipelineError::InvalidSource(_) => (
            "INVALID_SOURCE",
            false,
            Some("Check that the file exists or pass a full URL"),
            LogLevel::Debug,
        ),
        PipelineError::InvalidPolicy(_) => (
            "INVALID_POLICY",
            false,
            Some("Use one of the supported image mime types"),
            LogLevel::Debug,
        ),
        PipelineError::InvalidExtension { .. } => (
            "INVALID_EXTENSION",
            false,
            Some("Rename the file with an allowed extension"),
            LogLevel::Debug,
        ),
        PipelineError::MimeMismatch { .. } => (
            "MIME_MISMATCH",
            false,
            Some("Check image format and try a different file"),
            LogLevel::Debug,
        ),
        PipelineError::Read { .. } => (
            "READ_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Warn,
        ),
        PipelineError::Decode { .. } => (
            "DECODE_ERROR",
            false,
            Some("Check image format and try a different file"),
            LogLevel::Debug,
        ),
        PipelineError::InvalidDirectory(_) => (
            "INVALID_DIRECTORY",
            false,
            Some("Create the upload directory or pass an existing one"),
            LogLevel::Debug,
        ),
        PipelineError::DirectoryCreate { .. } => (
            "DIRECTORY_CREATE_FAILED",
            false,
            Some("Check permissions of the upload directory"),
            LogLevel::Error,
        ),
        PipelineError::InvalidName(_) => (
            "INVALID_NAME",
            false,
            Some("Use a name without path separators"),
            LogLevel::Debug,
        ),
        PipelineError::OperationNotSupported(_) => (
            "OPERATION_NOT_SUPPORTED",
            false,
            None,
            LogLevel::Debug,
        ),
        PipelineError::InvalidParent(_) => (
            "INVALID_PARENT",
            false,
            Some("Pass the positive id of an existing content record"),
            LogLevel::Debug,
        ),
        PipelineError::AttachmentRegistration { .. } => (
            "ATTACHMENT_REGISTRATION_FAILED",
            false,
            Some("Inspect the content store; completed steps are not rolled back"),
            LogLevel::Error,
        ),
    }
}

impl PipelineError {
    /// Get the error type name for detailed error output
    pub fn error_type(&self) -> &'static str {
        match self {
            PipelineError::InvalidSource(_) => "InvalidSource",
            PipelineError::InvalidPolicy(_) => "InvalidPolicy",
            PipelineError::InvalidExtension { .. } => "InvalidExtension",
            PipelineError::MimeMismatch { .. } => "MimeMismatch",
            PipelineError::Read { .. } => "Read",
            PipelineError::Decode { .. } => "Decode",
            PipelineError::InvalidDirectory(_) => "InvalidDirectory",
            PipelineError::DirectoryCreate { .. } => "DirectoryCreate",
            PipelineError::InvalidName(_) => "InvalidName",
            PipelineError::OperationNotSupported(_) => "OperationNotSupported",
            PipelineError::InvalidParent(_) => "InvalidParent",
            PipelineError::AttachmentRegistration { .. } => "AttachmentRegistration",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }

    /// Wrap a registrar failure for the given stage.
    pub fn registration(stage: RegistrationStage, err: impl std::fmt::Display) -> Self {
        PipelineError::AttachmentRegistration {
            stage,
            message: err.to_string(),
        }
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        pipeline_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).3
    }
}
