use crate::{
    HttpFetcher, LocalUploadDirs, RemoteFetcher, StorageResult, UploadDirProvider, UrlPolicy,
};
use pictor_core::IngestConfig;
use std::sync::Arc;
use std::time::Duration;

/// Create the upload-directory provider described by the configuration
pub fn create_upload_dirs(config: &IngestConfig) -> Arc<dyn UploadDirProvider> {
    Arc::new(LocalUploadDirs::new(
        config.upload_dir.clone(),
        config.dated_subdirs,
    ))
}

/// Create the remote fetcher described by the configuration
pub fn create_fetcher(config: &IngestConfig) -> StorageResult<Arc<dyn RemoteFetcher>> {
    let policy = UrlPolicy {
        allow_private_ips: config.allow_private_urls,
        allowlist: config.url_allowlist.clone(),
    };
    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.fetch_timeout_secs),
        config.max_remote_bytes,
        policy,
    )?;
    Ok(Arc::new(fetcher))
}
