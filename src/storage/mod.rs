//! Object storage module
//!
//! Defines the interface the request handler uses to reach a blob store,
//! and the backends that implement it:
//! - `memory`: in-process containers, used for tests and smoke runs
//! - `fs`: containers as subdirectories of a local root
//! - `timeout`: deadline decorator for any other store
//!
//! Lookups report absence as a value ([`FetchOutcome::NotFound`] or
//! `Ok(false)`), never as an error, so callers can branch on it directly.

pub mod fs;
pub mod memory;
pub mod timeout;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use timeout::TimeoutStore;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content: Bytes,
    pub content_type: String,
    /// MD5 of `content`
    pub content_hash: Vec<u8>,
}

impl Blob {
    /// Build a blob, computing its content hash
    pub fn new(content: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        use md5::{Digest, Md5};

        let content = content.into();
        let content_hash = Md5::digest(&content).to_vec();
        Self {
            content,
            content_type: content_type.into(),
            content_hash,
        }
    }
}

/// Result of fetching an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(Blob),
    NotFound,
}

/// Failure reported by a blob store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backend answered with (or is known to be in) an error state:
    /// unreachable, permission denied, missing container, timeout.
    #[error("{code}: {message}")]
    Fault { code: String, message: String },

    /// Anything the backend could not classify
    #[error("{category}: {message}")]
    Other {
        category: &'static str,
        message: String,
    },
}

impl StorageError {
    pub fn fault(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fault {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn other(category: &'static str, message: impl Into<String>) -> Self {
        Self::Other {
            category,
            message: message.into(),
        }
    }
}

/// Read access to containers of blobs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch an object with its content and metadata
    async fn get(&self, container: &str, name: &str) -> Result<FetchOutcome, StorageError>;

    /// Check whether an object exists without downloading it
    async fn exists(&self, container: &str, name: &str) -> Result<bool, StorageError>;
}

#[async_trait]
impl<S: BlobStore + ?Sized> BlobStore for Arc<S> {
    async fn get(&self, container: &str, name: &str) -> Result<FetchOutcome, StorageError> {
        (**self).get(container, name).await
    }

    async fn exists(&self, container: &str, name: &str) -> Result<bool, StorageError> {
        (**self).exists(container, name).await
    }
}

/// Error parsing a storage connection string
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConnectionStringError {
    #[error("malformed connection string segment '{0}' (expected Key=Value)")]
    Malformed(String),
    #[error("connection string names no storage backend (use LocalRoot=<dir> or UseInMemoryStorage=true)")]
    NoBackend,
    #[error("connection string names more than one storage backend")]
    Ambiguous,
}

/// Backend selected by a connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Local(String),
}

/// Parse a `Key=Value;Key=Value` connection string
///
/// Keys are case-insensitive, empty segments are ignored and unknown keys
/// are skipped.
pub fn parse_connection_string(conn: &str) -> Result<Backend, ConnectionStringError> {
    let mut backend = None;

    for segment in conn.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| ConnectionStringError::Malformed(segment.to_string()))?;
        let value = value.trim();

        let found = match key.trim().to_ascii_lowercase().as_str() {
            "localroot" if !value.is_empty() => Some(Backend::Local(value.to_string())),
            "useinmemorystorage" if value.eq_ignore_ascii_case("true") => Some(Backend::Memory),
            _ => None,
        };

        if let Some(found) = found {
            if backend.is_some() {
                return Err(ConnectionStringError::Ambiguous);
            }
            backend = Some(found);
        }
    }

    backend.ok_or(ConnectionStringError::NoBackend)
}

/// Open the store named by a connection string
///
/// A non-zero `timeout` wraps the store in a [`TimeoutStore`].
pub fn open(conn: &str, timeout: Duration) -> Result<Arc<dyn BlobStore>, ConnectionStringError> {
    let store: Arc<dyn BlobStore> = match parse_connection_string(conn)? {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::Local(root) => Arc::new(FsStore::new(root)),
    };

    if timeout.is_zero() {
        Ok(store)
    } else {
        Ok(Arc::new(TimeoutStore::new(store, timeout)))
    }
}
