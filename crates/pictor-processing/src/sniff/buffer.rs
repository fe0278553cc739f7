use super::{MimeSniffer, Sniffed, UNKNOWN_MIME};
use pictor_core::{PipelineResult, SniffStrategy};

/// Magic-byte signature matching over the full buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferSniffer;

impl MimeSniffer for BufferSniffer {
    fn strategy(&self) -> SniffStrategy {
        SniffStrategy::Buffer
    }

    fn sniff(&self, _origin: &str, data: &[u8]) -> PipelineResult<Sniffed> {
        let mime = infer::get(data)
            .map(|kind| kind.mime_type())
            .unwrap_or(UNKNOWN_MIME);

        Ok(Sniffed {
            mime: mime.to_string(),
            dimensions: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_signatures() {
        let sniffer = BufferSniffer;
        let gif = sniffer.sniff("a.gif", b"GIF89a\x01\x00\x01\x00").unwrap();
        assert_eq!(gif.mime, "image/gif");
        assert!(gif.dimensions.is_none());

        let png = sniffer
            .sniff("a.png", &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0])
            .unwrap();
        assert_eq!(png.mime, "image/png");

        let jpeg = sniffer.sniff("a.jpg", &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap();
        assert_eq!(jpeg.mime, "image/jpeg");
    }

    #[test]
    fn test_unknown_bytes_are_octet_stream() {
        let sniffer = BufferSniffer;
        assert_eq!(sniffer.sniff("a.png", b"hello").unwrap().mime, UNKNOWN_MIME);
        assert_eq!(sniffer.sniff("a.png", b"").unwrap().mime, UNKNOWN_MIME);
    }
}
