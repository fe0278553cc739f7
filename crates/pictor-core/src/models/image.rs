//! Stage values of the ingest pipeline
//!
//! `ImageSource -> ValidatedImage -> NamedImage -> PersistedImage`. Each stage owns the value
//! produced by the previous one and only adds to it; transitions consume `self` and return
//! the next value instead of mutating in place.

use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the bytes of an image come from. Exactly one is true for any source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

/// A classified origin string
#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    origin: String,
    kind: SourceKind,
    basename: String,
    path: String,
}

impl ImageSource {
    pub fn new(
        origin: impl Into<String>,
        kind: SourceKind,
        basename: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            kind,
            basename: basename.into(),
            path: path.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn is_url(&self) -> bool {
        self.kind == SourceKind::Remote
    }

    /// Last path component of the origin (for URLs, the last path segment)
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Origin path for local files, the full URL for remote ones
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Text after the final `.` of the basename; empty when there is none.
    pub fn extension(&self) -> &str {
        match self.basename.rfind('.') {
            Some(idx) => &self.basename[idx + 1..],
            None => "",
        }
    }
}

/// Pixel dimensions, only known when the header-decode strategy ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A source whose extension and content both passed the active mime restriction
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedImage {
    #[serde(flatten)]
    source: ImageSource,
    mime: String,
    extension: String,
    size: Option<u64>,
    dimensions: Option<Dimensions>,
    #[serde(skip)]
    buffer: Option<Bytes>,
}

impl ValidatedImage {
    /// Assemble a validated image. The validator is the only intended caller: it is
    /// responsible for checking `mime` and `extension` against the restriction.
    pub fn new(
        source: ImageSource,
        mime: impl Into<String>,
        extension: impl Into<String>,
        size: Option<u64>,
        dimensions: Option<Dimensions>,
        buffer: Option<Bytes>,
    ) -> Self {
        Self {
            source,
            mime: mime.into(),
            extension: extension.into(),
            size,
            dimensions,
            buffer,
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Byte size, known for local sources only
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn width(&self) -> Option<u32> {
        self.dimensions.map(|d| d.width)
    }

    pub fn height(&self) -> Option<u32> {
        self.dimensions.map(|d| d.height)
    }

    /// Fetched bytes of a remote source, until released after a save
    pub fn buffer(&self) -> Option<&Bytes> {
        self.buffer.as_ref()
    }
}

/// A validated image with its canonical name
#[derive(Debug, Clone, Serialize)]
pub struct NamedImage {
    #[serde(flatten)]
    image: ValidatedImage,
    only_name: String,
    name: String,
}

impl NamedImage {
    /// `only_name` must already be sanitized (or deliberately raw).
    pub fn new(image: ValidatedImage, only_name: impl Into<String>) -> Self {
        let only_name = only_name.into();
        let name = format!("{}.{}", only_name, image.extension());
        Self {
            image,
            only_name,
            name,
        }
    }

    pub fn renamed(self, only_name: impl Into<String>) -> Self {
        Self::new(self.image, only_name)
    }

    pub fn image(&self) -> &ValidatedImage {
        &self.image
    }

    pub fn into_image(self) -> ValidatedImage {
        self.image
    }

    /// Base name without extension
    pub fn only_name(&self) -> &str {
        &self.only_name
    }

    /// Canonical file name: `only_name` + "." + extension
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A named image with its destination resolved inside an existing upload directory
#[derive(Debug, Clone, Serialize)]
pub struct PersistedImage {
    #[serde(flatten)]
    named: NamedImage,
    upload_dir: PathBuf,
    full_path: PathBuf,
}

impl PersistedImage {
    /// `upload_dir` must be absolute and already exist.
    pub fn new(named: NamedImage, upload_dir: impl Into<PathBuf>) -> Self {
        let upload_dir = upload_dir.into();
        let full_path = upload_dir.join(named.name());
        Self {
            named,
            upload_dir,
            full_path,
        }
    }

    pub fn named(&self) -> &NamedImage {
        &self.named
    }

    pub fn image(&self) -> &ValidatedImage {
        self.named.image()
    }

    pub fn into_named(self) -> NamedImage {
        self.named
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Drop the fetched byte buffer once it has been written.
    pub fn release_buffer(&mut self) {
        self.named.image.buffer = None;
    }
}
