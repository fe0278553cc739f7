pub mod attachment;
pub mod image;
pub mod policy;

pub use attachment::{AttachmentPost, AttachmentRecord};
pub use image::{Dimensions, ImageSource, NamedImage, PersistedImage, SourceKind, ValidatedImage};
pub use policy::{MimeExtensionPolicy, MimeRestriction, MIME_EXTENSIONS};
