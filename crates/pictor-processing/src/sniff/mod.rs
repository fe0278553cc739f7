//! Content sniffing strategies
//!
//! Both strategies determine the mime type from the bytes alone, independent of the
//! origin's extension. The header strategy also reports pixel dimensions.

mod buffer;
mod header;

pub use buffer::BufferSniffer;
pub use header::HeaderSniffer;

use pictor_core::{Dimensions, PipelineResult, SniffStrategy};

/// Mime type reported for bytes no signature matches
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Result of sniffing one byte buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    pub mime: String,
    pub dimensions: Option<Dimensions>,
}

pub trait MimeSniffer: Send + Sync {
    fn strategy(&self) -> SniffStrategy;

    /// Determine the mime type of `data`. `origin` is only used in error messages.
    fn sniff(&self, origin: &str, data: &[u8]) -> PipelineResult<Sniffed>;
}

pub fn sniffer_for(strategy: SniffStrategy) -> Box<dyn MimeSniffer> {
    match strategy {
        SniffStrategy::Buffer => Box::new(BufferSniffer),
        SniffStrategy::Header => Box::new(HeaderSniffer),
    }
}
