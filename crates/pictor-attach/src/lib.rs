//! Pictor Attach Library
//!
//! Registers a persisted image as an attachment of a parent content item in an external
//! content store. The store is reached through the [`ContentRegistrar`] trait.

pub mod registrar;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use registrar::{parse_parent_id, register_attachment, ContentRegistrar};
