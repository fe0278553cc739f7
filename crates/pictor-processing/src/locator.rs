//! Source locator
//!
//! Classifies an origin string as a remote URL or a local file.

use percent_encoding::percent_decode_str;
use pictor_core::{ImageSource, PipelineError, PipelineResult, SourceKind};
use std::path::Path;
use url::Url;

/// Classify `origin`.
///
/// Anything that parses as a URL with a scheme of two or more characters is remote and is
/// not checked further here. Everything else must name an existing regular file.
pub async fn locate(origin: &str) -> PipelineResult<ImageSource> {
    if let Some(url) = parse_remote(origin) {
        let basename = remote_basename(&url);
        tracing::debug!(origin = %origin, basename = %basename, "Origin is remote");
        return Ok(ImageSource::new(origin, SourceKind::Remote, basename, origin));
    }

    let is_file = tokio::fs::metadata(origin)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(PipelineError::InvalidSource(format!(
            "{} is neither a URL nor an existing file",
            origin
        )));
    }

    let basename = Path::new(origin)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| origin.to_string());

    Ok(ImageSource::new(origin, SourceKind::Local, basename, origin))
}

// Single-letter schemes are Windows drive letters (C:\...), not URLs.
fn parse_remote(origin: &str) -> Option<Url> {
    Url::parse(origin)
        .ok()
        .filter(|url| url.scheme().len() > 1)
}

/// Last non-empty path segment, percent-decoded; query and fragment are ignored.
fn remote_basename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
