//! In-memory blob store

use super::{Blob, BlobStore, FetchOutcome, StorageError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Containers held in process memory
///
/// `set_offline(true)` makes every call fail with a `ServiceUnavailable`
/// fault, which is how tests simulate a storage outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    containers: RwLock<HashMap<String, HashMap<String, Blob>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container (no-op if it exists)
    pub fn create_container(&self, container: &str) {
        self.containers
            .write()
            .entry(container.to_string())
            .or_default();
    }

    /// Store an object, creating its container if needed
    pub fn put(&self, container: &str, name: &str, blob: Blob) {
        self.containers
            .write()
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), blob);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StorageError::fault(
                "ServiceUnavailable",
                "storage backend is offline",
            ));
        }
        Ok(())
    }

    fn lookup<T>(
        &self,
        container: &str,
        f: impl FnOnce(&HashMap<String, Blob>) -> T,
    ) -> Result<T, StorageError> {
        self.check_online()?;
        let containers = self.containers.read();
        let blobs = containers.get(container).ok_or_else(|| {
            StorageError::fault(
                "ContainerNotFound",
                format!("container '{container}' does not exist"),
            )
        })?;
        Ok(f(blobs))
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, container: &str, name: &str) -> Result<FetchOutcome, StorageError> {
        self.lookup(container, |blobs| {
            blobs
                .get(name)
                .cloned()
                .map_or(FetchOutcome::NotFound, FetchOutcome::Found)
        })
    }

    async fn exists(&self, container: &str, name: &str) -> Result<bool, StorageError> {
        self.lookup(container, |blobs| blobs.contains_key(name))
    }
}
