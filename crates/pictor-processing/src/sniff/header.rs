use super::{MimeSniffer, Sniffed};
use image::ImageReader;
use pictor_core::{Dimensions, PipelineError, PipelineResult, SniffStrategy};
use std::io::Cursor;

/// Container header decode; yields the format and pixel dimensions without decoding pixels
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSniffer;

impl MimeSniffer for HeaderSniffer {
    fn strategy(&self) -> SniffStrategy {
        SniffStrategy::Header
    }

    fn sniff(&self, origin: &str, data: &[u8]) -> PipelineResult<Sniffed> {
        let decode_error = |message: String| PipelineError::Decode {
            origin: origin.to_string(),
            message,
        };

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| decode_error("unrecognized image format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| decode_error(e.to_string()))?;

        Ok(Sniffed {
            mime: format.to_mime_type().to_string(),
            dimensions: Some(Dimensions { width, height }),
        })
    }
}
