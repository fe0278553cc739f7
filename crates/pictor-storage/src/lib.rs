//! Pictor Storage Library
//!
//! Filesystem and network collaborators of the ingest pipeline: the upload-directory
//! provider and the remote byte fetcher, plus the URL checks applied before fetching.

pub mod factory;
pub mod fetch;
pub mod local;
pub mod traits;
pub mod url_guard;

// Re-export commonly used types
pub use factory::{create_fetcher, create_upload_dirs};
pub use fetch::HttpFetcher;
pub use local::LocalUploadDirs;
pub use traits::{RemoteFetcher, StorageError, StorageResult, UploadDirProvider};
pub use url_guard::{check_url, UrlPolicy};
