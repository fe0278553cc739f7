//! Mime type / extension policy
//!
//! The policy is a fixed table. A validation run is restricted either to one mime type or
//! to the whole table; [`MimeRestriction`] is that resolved view.

use crate::error::{PipelineError, PipelineResult};
use serde::Serialize;

/// Built-in mapping of canonical mime type to accepted extensions.
///
/// Every extension appears under exactly one mime type.
pub const MIME_EXTENSIONS: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg", "jpe"]),
    ("image/gif", &["gif"]),
    ("image/png", &["png"]),
    ("image/bmp", &["bmp"]),
    ("image/tiff", &["tif", "tiff"]),
    ("image/x-icon", &["ico"]),
];

/// Non-canonical names sniffers report for types the table knows under another name.
const MIME_ALIASES: &[(&str, &str)] = &[
    ("image/vnd.microsoft.icon", "image/x-icon"),
    ("image/x-ms-bmp", "image/bmp"),
    ("image/pjpeg", "image/jpeg"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MimeExtensionPolicy;

impl MimeExtensionPolicy {
    /// All canonical mime types, in table order
    pub fn mime_types(&self) -> impl Iterator<Item = &'static str> {
        MIME_EXTENSIONS.iter().map(|(mime, _)| *mime)
    }

    pub fn extensions_for(&self, mime: &str) -> Option<&'static [&'static str]> {
        MIME_EXTENSIONS
            .iter()
            .find(|(m, _)| *m == mime)
            .map(|(_, exts)| *exts)
    }

    /// Mime type whose extension set contains `extension` (case-sensitive)
    pub fn mime_for_extension(&self, extension: &str) -> Option<&'static str> {
        MIME_EXTENSIONS
            .iter()
            .find(|(_, exts)| exts.contains(&extension))
            .map(|(mime, _)| *mime)
    }

    /// Map sniffer aliases onto the canonical name used by the table.
    pub fn canonical_mime<'a>(&self, mime: &'a str) -> &'a str {
        MIME_ALIASES
            .iter()
            .find(|(alias, _)| *alias == mime)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(mime)
    }

    /// Resolve the restriction for a validation run.
    ///
    /// `None` allows the whole table. A mime type absent from the table fails with
    /// [`PipelineError::InvalidPolicy`] before any source is touched.
    pub fn restrict(&self, mime: Option<&str>) -> PipelineResult<MimeRestriction> {
        match mime {
            None => Ok(MimeRestriction {
                mime_types: self.mime_types().collect(),
                extensions: MIME_EXTENSIONS
                    .iter()
                    .flat_map(|(_, exts)| exts.iter().copied())
                    .collect(),
            }),
            Some(requested) => {
                let (mime, exts) = MIME_EXTENSIONS
                    .iter()
                    .find(|(m, _)| *m == requested)
                    .ok_or_else(|| PipelineError::InvalidPolicy(requested.to_string()))?;
                Ok(MimeRestriction {
                    mime_types: vec![*mime],
                    extensions: exts.to_vec(),
                })
            }
        }
    }
}

/// The mime types and extensions accepted by one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimeRestriction {
    mime_types: Vec<&'static str>,
    extensions: Vec<&'static str>,
}

impl MimeRestriction {
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.extensions.contains(&extension)
    }

    pub fn allows_mime(&self, mime: &str) -> bool {
        self.mime_types.contains(&mime)
    }

    pub fn mime_types(&self) -> &[&'static str] {
        &self.mime_types
    }

    pub fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    /// True when the run is restricted to a single mime type
    pub fn is_restricted(&self) -> bool {
        self.mime_types.len() == 1
    }
}
