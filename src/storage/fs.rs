//! Local filesystem blob store
//!
//! Each container is a subdirectory of the store root; object names map to
//! relative paths inside it. Content types come from the file extension.

use super::{Blob, BlobStore, FetchOutcome, StorageError};
use crate::http::mime;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the container directory, checking that the store and the
    /// container are both reachable
    async fn container_dir(&self, container: &str) -> Result<PathBuf, StorageError> {
        if !is_plain_segment(container) {
            return Err(StorageError::fault(
                "InvalidResourceName",
                format!("'{container}' is not a valid container name"),
            ));
        }

        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(StorageError::fault(
                    "ServiceUnavailable",
                    format!("store root '{}' is not a directory", self.root.display()),
                ))
            }
            Err(e) => {
                return Err(StorageError::fault(
                    "ServiceUnavailable",
                    format!("store root '{}' is unreachable: {e}", self.root.display()),
                ))
            }
        }

        let dir = self.root.join(container);
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(container_not_found(container)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(container_not_found(container)),
            Err(e) => Err(io_fault(&e)),
        }
    }

    /// Locate a regular file for `name`, or `None` when there is no such object
    async fn object_path(&self, container: &str, name: &str) -> Result<Option<PathBuf>, StorageError> {
        let dir = self.container_dir(container).await?;

        // Names that could escape the container or address a directory are
        // simply absent
        if !name.split('/').all(is_plain_segment) {
            return Ok(None);
        }

        let path = dir.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(io_fault(&e)),
        }
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn get(&self, container: &str, name: &str) -> Result<FetchOutcome, StorageError> {
        let Some(path) = self.object_path(container, name).await? else {
            return Ok(FetchOutcome::NotFound);
        };

        let content = match fs::read(&path).await {
            Ok(content) => content,
            // Removed between the metadata check and the read
            Err(e) if is_absent(&e) => return Ok(FetchOutcome::NotFound),
            Err(e) => return Err(io_fault(&e)),
        };

        let content_type = mime::content_type_for(&path);
        Ok(FetchOutcome::Found(Blob::new(content, content_type)))
    }

    async fn exists(&self, container: &str, name: &str) -> Result<bool, StorageError> {
        Ok(self.object_path(container, name).await?.is_some())
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

fn is_absent(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn container_not_found(container: &str) -> StorageError {
    StorageError::fault(
        "ContainerNotFound",
        format!("container '{container}' does not exist"),
    )
}

fn io_fault(e: &io::Error) -> StorageError {
    StorageError::fault(format!("{:?}", e.kind()), e.to_string())
}
