//! Test helpers for registration tests
//!
//! In-memory content store usable without any external service.

pub mod mock_registrar;

pub use mock_registrar::{MockRegistrar, StoredAttachment};
