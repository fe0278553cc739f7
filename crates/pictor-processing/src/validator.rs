use crate::sniff::{sniffer_for, MimeSniffer};
use bytes::Bytes;
use pictor_core::{
    ImageSource, MimeExtensionPolicy, MimeRestriction, PipelineError, PipelineResult,
    SniffStrategy, ValidatedImage,
};
use pictor_storage::RemoteFetcher;
use std::sync::Arc;

/// Mime/extension validator
///
/// Runs two independent checks against the same restriction: the origin's extension, then
/// the sniffed content type. Both must pass. The extension-implied mime type is not compared
/// with the sniffed one, so `beach.png` holding GIF bytes validates as `image/gif` when both
/// types are allowed.
pub struct ImageValidator {
    policy: MimeExtensionPolicy,
    restriction: MimeRestriction,
    sniffer: Box<dyn MimeSniffer>,
    fetcher: Option<Arc<dyn RemoteFetcher>>,
}

impl ImageValidator {
    /// Configure a validator. Fails with `InvalidPolicy` for a mime type the policy table
    /// does not know, before any source is looked at.
    pub fn new(
        mime: Option<&str>,
        strategy: SniffStrategy,
        fetcher: Option<Arc<dyn RemoteFetcher>>,
    ) -> PipelineResult<Self> {
        Self::with_sniffer(mime, sniffer_for(strategy), fetcher)
    }

    pub fn with_sniffer(
        mime: Option<&str>,
        sniffer: Box<dyn MimeSniffer>,
        fetcher: Option<Arc<dyn RemoteFetcher>>,
    ) -> PipelineResult<Self> {
        let policy = MimeExtensionPolicy;
        let restriction = policy.restrict(mime)?;
        Ok(Self {
            policy,
            restriction,
            sniffer,
            fetcher,
        })
    }

    pub fn restriction(&self) -> &MimeRestriction {
        &self.restriction
    }

    pub fn strategy(&self) -> SniffStrategy {
        self.sniffer.strategy()
    }

    /// Extension phase. Case-sensitive; reads nothing.
    pub fn check_extension(&self, source: &ImageSource) -> PipelineResult<()> {
        let extension = source.extension();
        if !self.restriction.allows_extension(extension) {
            return Err(PipelineError::InvalidExtension {
                extension: extension.to_string(),
                allowed: to_strings(self.restriction.extensions()),
            });
        }
        Ok(())
    }

    /// Validate `source`, consuming it into a [`ValidatedImage`].
    ///
    /// Local sources get their byte size recorded. Remote sources keep the fetched buffer
    /// so the bytes are written without a second fetch.
    pub async fn validate(&self, source: ImageSource) -> PipelineResult<ValidatedImage> {
        self.check_extension(&source)?;

        let size = if source.is_url() {
            None
        } else {
            let metadata = tokio::fs::metadata(source.path())
                .await
                .map_err(|e| read_error(&source, e))?;
            Some(metadata.len())
        };

        let data = self.read_bytes(&source).await?;
        let sniffed = self.sniffer.sniff(source.origin(), &data)?;
        let mime = self.policy.canonical_mime(&sniffed.mime).to_string();

        if !self.restriction.allows_mime(&mime) {
            return Err(PipelineError::MimeMismatch {
                detected: mime,
                allowed: to_strings(self.restriction.mime_types()),
            });
        }

        tracing::debug!(
            origin = %source.origin(),
            mime = %mime,
            extension = %source.extension(),
            strategy = %self.sniffer.strategy(),
            size_bytes = data.len(),
            "Image validated"
        );

        let extension = source.extension().to_string();
        let buffer = source.is_url().then_some(data);
        Ok(ValidatedImage::new(
            source,
            mime,
            extension,
            size,
            sniffed.dimensions,
            buffer,
        ))
    }

    async fn read_bytes(&self, source: &ImageSource) -> PipelineResult<Bytes> {
        if !source.is_url() {
            let data = tokio::fs::read(source.path())
                .await
                .map_err(|e| read_error(source, e))?;
            return Ok(Bytes::from(data));
        }

        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| read_error(source, "no remote fetcher configured"))?;
        fetcher
            .fetch(source.origin())
            .await
            .map_err(|e| read_error(source, e))
    }
}

fn read_error(source: &ImageSource, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Read {
        origin: source.origin().to_string(),
        message: err.to_string(),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
