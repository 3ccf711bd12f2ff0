//! Deadline decorator for blob stores

use super::{BlobStore, FetchOutcome, StorageError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Wraps a store so every call fails with an `OperationTimedOut` fault once
/// `timeout` elapses
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutStore<S> {
    pub const fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn run<T>(
        &self,
        op: &str,
        fut: impl Future<Output = Result<T, StorageError>> + Send,
    ) -> Result<T, StorageError> {
        tokio::time::timeout(self.timeout, fut).await.map_err(|_| {
            StorageError::fault(
                "OperationTimedOut",
                format!("{op} did not complete within {}ms", self.timeout.as_millis()),
            )
        })?
    }
}

#[async_trait]
impl<S: BlobStore> BlobStore for TimeoutStore<S> {
    async fn get(&self, container: &str, name: &str) -> Result<FetchOutcome, StorageError> {
        self.run("get", self.inner.get(container, name)).await
    }

    async fn exists(&self, container: &str, name: &str) -> Result<bool, StorageError> {
        self.run("exists", self.inner.exists(container, name)).await
    }
}
