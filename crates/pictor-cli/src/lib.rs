use pictor_core::{ErrorMetadata, LogFormat, LogLevel, PipelineError};
use serde::Serialize;

/// Initialize tracing for the CLI.
///
/// `RUST_LOG` wins over the default `info` filter. Logs go to stderr so stdout only carries
/// the JSON output.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Machine-readable description of a failed pipeline operation
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub code: &'static str,
    pub recoverable: bool,
    pub suggested_action: Option<&'static str>,
}

impl From<&PipelineError> for ErrorReport {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.detailed_message(),
            code: err.error_code(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
        }
    }
}

/// Log a pipeline error at the level it declares
pub fn log_error(err: &PipelineError) {
    let error_type = err.error_type();
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %err, error_type = error_type, "Pipeline operation failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %err, error_type = error_type, "Pipeline operation failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %err, error_type = error_type, "Pipeline operation failed");
        }
    }
}
