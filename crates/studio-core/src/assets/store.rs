//! Read-only file store backends.
//!
//! [`FileStore`] is the only seam between the resolver and storage. The
//! resolver needs three answers from it: does the entry exist, can it be read,
//! and what are its bytes. Absence is reported as `Ok(false)`; only real I/O
//! faults come back as [`CoreError::StoreUnavailable`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::path::RequestPath;
use crate::error::{CoreError, CoreResult};

/// Content of a resolved resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Path of the resource that was actually read.
    pub path: RequestPath,
    pub bytes: Vec<u8>,
    /// `true` when this is the SPA fallback document standing in for a miss.
    pub fallback: bool,
}

impl Asset {
    pub fn new(path: RequestPath, bytes: Vec<u8>) -> Self {
        Self {
            path,
            bytes,
            fallback: false,
        }
    }
}

/// Read-only lookup from relative path to content.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Whether anything (file or directory) exists at `path`.
    async fn exists(&self, path: &RequestPath) -> CoreResult<bool>;

    /// Whether `path` is a regular file the process can read.
    async fn is_readable(&self, path: &RequestPath) -> CoreResult<bool>;

    /// Reads the whole resource.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the resource vanished.
    /// - [`CoreError::StoreUnavailable`] on any other I/O fault.
    async fn open(&self, path: &RequestPath) -> CoreResult<Asset>;
}

/// Store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Opens a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::RootNotFound`] if `root` is missing or not a directory.
    /// - [`CoreError::StoreUnavailable`] if `root` cannot be inspected.
    pub fn new(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        match std::fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(CoreError::RootNotFound(root)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CoreError::RootNotFound(root)),
            Err(e) => Err(CoreError::store_unavailable(root.display().to_string(), e)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &RequestPath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

fn is_absent(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NotFound | ErrorKind::NotADirectory)
}

#[async_trait]
impl FileStore for DiskStore {
    async fn exists(&self, path: &RequestPath) -> CoreResult<bool> {
        match tokio::fs::metadata(self.full_path(path)).await {
            Ok(_) => Ok(true),
            Err(e) if is_absent(e.kind()) => Ok(false),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                tracing::debug!("Permission denied while probing {path}");
                Ok(false)
            }
            Err(e) => Err(CoreError::store_unavailable(path.as_str(), e)),
        }
    }

    async fn is_readable(&self, path: &RequestPath) -> CoreResult<bool> {
        let full = self.full_path(path);
        let meta = match tokio::fs::metadata(&full).await {
            Ok(meta) => meta,
            Err(e) if is_absent(e.kind()) || e.kind() == ErrorKind::PermissionDenied => {
                return Ok(false)
            }
            Err(e) => return Err(CoreError::store_unavailable(path.as_str(), e)),
        };
        if !meta.is_file() {
            return Ok(false);
        }

        match tokio::fs::File::open(&full).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                tracing::debug!("File exists but is not readable: {path}");
                Ok(false)
            }
            Err(e) if is_absent(e.kind()) => Ok(false),
            Err(e) => Err(CoreError::store_unavailable(path.as_str(), e)),
        }
    }

    async fn open(&self, path: &RequestPath) -> CoreResult<Asset> {
        match tokio::fs::read(self.full_path(path)).await {
            Ok(bytes) => Ok(Asset::new(path.clone(), bytes)),
            Err(e) if is_absent(e.kind()) => Err(CoreError::NotFound(path.to_string())),
            Err(e) => Err(CoreError::store_unavailable(path.as_str(), e)),
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    bytes: Vec<u8>,
    readable: bool,
}

/// In-memory store.
///
/// Directories are implied by file keys: `static/app.js` makes `static`
/// exist but not readable. [`MemoryStore::set_offline`] makes every call fail
/// with [`CoreError::StoreUnavailable`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, MemoryEntry>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a readable file.
    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes, true);
        self
    }

    /// Adds a file that exists but cannot be read.
    pub fn with_unreadable(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes, false);
        self
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>, readable: bool) {
        self.entries.insert(
            path.trim_start_matches('/').to_string(),
            MemoryEntry {
                bytes: bytes.into(),
                readable,
            },
        );
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self, path: &RequestPath) -> CoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoreError::store_unavailable(
                path.as_str(),
                std::io::Error::new(ErrorKind::Other, "memory store is offline"),
            ));
        }
        Ok(())
    }

    fn is_directory(&self, path: &RequestPath) -> bool {
        let dir = path.as_str().trim_end_matches('/');
        if dir.is_empty() {
            return true;
        }
        let prefix = format!("{dir}/");
        self.entries.keys().any(|key| key.starts_with(&prefix))
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn exists(&self, path: &RequestPath) -> CoreResult<bool> {
        self.check_online(path)?;
        Ok(self.entries.contains_key(path.as_str()) || self.is_directory(path))
    }

    async fn is_readable(&self, path: &RequestPath) -> CoreResult<bool> {
        self.check_online(path)?;
        Ok(self
            .entries
            .get(path.as_str())
            .map(|entry| entry.readable)
            .unwrap_or(false))
    }

    async fn open(&self, path: &RequestPath) -> CoreResult<Asset> {
        self.check_online(path)?;
        match self.entries.get(path.as_str()) {
            Some(entry) if entry.readable => Ok(Asset::new(path.clone(), entry.bytes.clone())),
            Some(_) => Err(CoreError::store_unavailable(
                path.as_str(),
                std::io::Error::new(ErrorKind::PermissionDenied, "entry is not readable"),
            )),
            None => Err(CoreError::NotFound(path.to_string())),
        }
    }
}
