//! Shared fixtures for pipeline integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, RgbImage};
use pictor_processing::Collaborators;
use pictor_storage::{LocalUploadDirs, RemoteFetcher, StorageError, StorageResult};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Encode a blank RGB image of the given size
pub fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut buf, format)
        .expect("encode fixture image");
    buf.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(ImageFormat::Png, width, height)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    encode(ImageFormat::Gif, width, height)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(ImageFormat::Jpeg, width, height)
}

/// Write `data` to `dir/name` and return the path as a string origin
pub fn write_fixture(dir: &Path, name: &str, data: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write fixture");
    path.to_str().expect("utf-8 path").to_string()
}

/// In-memory fetcher keyed by URL; unknown URLs fail like an unreachable host
#[derive(Clone, Default)]
pub struct StaticFetcher {
    bodies: Arc<Mutex<HashMap<String, Bytes>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: impl Into<Bytes>) -> Self {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> StorageResult<Bytes> {
        self.calls.lock().unwrap().push(url.to_string());
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| StorageError::DownloadFailed(format!("no route to {}", url)))
    }
}

/// Collaborators writing under `base` (no dated subdirectories)
pub fn collaborators(base: &Path, fetcher: Option<StaticFetcher>) -> Collaborators {
    Collaborators {
        dirs: Arc::new(LocalUploadDirs::new(base, false)),
        fetcher: fetcher.map(|f| Arc::new(f) as Arc<dyn RemoteFetcher>),
    }
}

pub fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).expect("canonicalize")
}
