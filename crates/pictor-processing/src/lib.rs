//! Pictor Processing Library
//!
//! The image ingest pipeline: locate the origin, validate extension and content against the
//! mime policy, derive the canonical name, resolve the destination and persist the bytes.
//!
//! [`ImageIngest`] drives the stages for one image. The stage functions are public as well
//! so callers can run them individually.

pub mod ingest;
pub mod locator;
pub mod naming;
pub mod path;
pub mod persist;
pub mod sniff;
pub mod validator;

pub use ingest::{Collaborators, ImageIngest, IngestOptions};
pub use locator::locate;
pub use sniff::{sniffer_for, BufferSniffer, HeaderSniffer, MimeSniffer, Sniffed};
pub use validator::ImageValidator;
