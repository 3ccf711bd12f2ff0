//! Blob serving module
//!
//! Decides, for one resolved path inside a container, whether to serve an
//! object, substitute the index, redirect to the canonical directory URL,
//! or report a failure. Every branch ends in exactly one [`BlobResult`] and
//! one log line.

use crate::handler::result::{BlobResult, StatusMessage};
use crate::resolver;
use crate::storage::{BlobStore, FetchOutcome, StorageError};
use std::sync::Arc;
use tracing::{error, info, warn};

/// A request for an object, after routing and path normalisation
#[derive(Debug, Clone, Copy)]
pub struct BlobRequest<'a> {
    /// HTTP method, for logging
    pub method: &'a str,
    pub container: &'a str,
    /// Absolute URI the resolved path is relative to (no trailing slash)
    pub base_uri: &'a str,
    /// Resolved path: `""`, `"/"`, or `"/<segments>"`
    pub path: &'a str,
}

/// Serves objects from a store with static-website semantics
pub struct BlobHandler {
    store: Arc<dyn BlobStore>,
    index_name: Option<String>,
}

impl BlobHandler {
    /// An empty `index_name` disables index substitution
    pub fn new(store: Arc<dyn BlobStore>, index_name: Option<&str>) -> Self {
        Self {
            store,
            index_name: index_name.filter(|s| !s.is_empty()).map(ToString::to_string),
        }
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    /// Serve a blob request. Never fails: storage errors become a 500.
    pub async fn serve(&self, req: &BlobRequest<'_>) -> BlobResult {
        // Requests to the container root must end in / to keep relative
        // links inside the container
        if req.path.is_empty() {
            let url = format!("{}/", req.base_uri);
            info!(method = req.method, path = req.path, status = 301, location = %url, "redirecting container root");
            return BlobResult::permanent_redirect(url);
        }

        let candidate = resolver::index_candidate(req.path, self.index_name());

        match self.fetch(req, &candidate).await {
            Ok(result) => result,
            Err(err) => internal_error(req.method, &candidate, &err),
        }
    }

    async fn fetch(&self, req: &BlobRequest<'_>, candidate: &str) -> Result<BlobResult, StorageError> {
        let name = candidate.strip_prefix('/').unwrap_or(candidate);

        match self.store.get(req.container, name).await? {
            FetchOutcome::Found(blob) => {
                let result = BlobResult::object(blob);
                if let BlobResult::ObjectBody {
                    content_type, etag, ..
                } = &result
                {
                    info!(method = req.method, path = candidate, status = 200, content_type = %content_type, etag = %etag, "served object");
                }
                Ok(result)
            }
            FetchOutcome::NotFound => {
                if let Some(url) = self.nested_index_redirect(req, candidate, name).await? {
                    info!(method = req.method, path = candidate, status = 301, location = %url, "redirecting to nested index");
                    return Ok(BlobResult::permanent_redirect(url));
                }
                warn!(method = req.method, path = candidate, status = 404, "object not found");
                Ok(BlobResult::Status(StatusMessage::NotFound))
            }
        }
    }

    /// A path without a trailing slash may name a directory holding its own
    /// index. Only probed after the object itself was not found, and never
    /// for a request that already targets the index file.
    async fn nested_index_redirect(
        &self,
        req: &BlobRequest<'_>,
        candidate: &str,
        name: &str,
    ) -> Result<Option<String>, StorageError> {
        let Some(index) = self.index_name() else {
            return Ok(None);
        };
        if resolver::file_name(candidate) == index {
            return Ok(None);
        }

        let nested = format!("{name}/{index}");
        if self.store.exists(req.container, &nested).await? {
            Ok(Some(format!("{}{}/", req.base_uri, req.path)))
        } else {
            Ok(None)
        }
    }
}

fn internal_error(method: &str, path: &str, err: &StorageError) -> BlobResult {
    match err {
        StorageError::Fault { code, message } => {
            error!(method, path, status = 500, code = %code, reason = %message, "storage fault");
        }
        StorageError::Other { category, message } => {
            error!(method, path, status = 500, category = *category, reason = %message, "request failed");
        }
    }
    BlobResult::Status(StatusMessage::InternalServerError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Blob, MemoryStore};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::fmt;
    use tracing::field::{Field, Visit};
    use tracing::instrument::WithSubscriber;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    const BASE: &str = "http://localhost/C";

    /// Records every call before delegating to a memory store
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for RecordingStore {
        async fn get(&self, container: &str, name: &str) -> Result<FetchOutcome, StorageError> {
            self.calls.lock().push(format!("get {name}"));
            self.inner.get(container, name).await
        }

        async fn exists(&self, container: &str, name: &str) -> Result<bool, StorageError> {
            self.calls.lock().push(format!("exists {name}"));
            self.inner.exists(container, name).await
        }
    }

    /// Objects are always missing and the existence probe fails
    struct BrokenProbeStore;

    #[async_trait]
    impl BlobStore for BrokenProbeStore {
        async fn get(&self, _: &str, _: &str) -> Result<FetchOutcome, StorageError> {
            Ok(FetchOutcome::NotFound)
        }

        async fn exists(&self, _: &str, _: &str) -> Result<bool, StorageError> {
            Err(StorageError::fault("AuthorizationFailure", "denied"))
        }
    }

    /// Fails with an error the backend could not classify
    struct ConfusedStore;

    #[async_trait]
    impl BlobStore for ConfusedStore {
        async fn get(&self, _: &str, _: &str) -> Result<FetchOutcome, StorageError> {
            Err(StorageError::other("transport", "connection reset"))
        }

        async fn exists(&self, _: &str, _: &str) -> Result<bool, StorageError> {
            Ok(false)
        }
    }

    /// One captured log event: its level and its fields rendered as text
    #[derive(Debug)]
    struct LogLine {
        level: Level,
        fields: HashMap<String, String>,
    }

    impl LogLine {
        fn field(&self, name: &str) -> &str {
            self.fields
                .get(name)
                .map_or_else(|| panic!("missing field {name} in {self:?}"), String::as_str)
        }
    }

    #[derive(Default)]
    struct FieldVisitor(HashMap<String, String>);

    impl Visit for FieldVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    /// Keeps every event so tests can check outcome log lines
    #[derive(Clone, Default)]
    struct CaptureLayer {
        lines: Arc<Mutex<Vec<LogLine>>>,
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.lines.lock().push(LogLine {
                level: *event.metadata().level(),
                fields: visitor.0,
            });
        }
    }

    /// Serve `path` and return the result with the single line it logged
    async fn serve_logged(handler: &BlobHandler, path: &str) -> (BlobResult, LogLine) {
        let layer = CaptureLayer::default();
        let lines = Arc::clone(&layer.lines);
        let subscriber = tracing_subscriber::registry().with(layer);

        let result = serve(handler, path).with_subscriber(subscriber).await;

        let mut lines = std::mem::take(&mut *lines.lock());
        assert_eq!(lines.len(), 1, "expected one log line, got {lines:?}");
        let line = lines.remove(0);
        assert_eq!(line.field("method"), "GET");
        (result, line)
    }

    fn site() -> Arc<RecordingStore> {
        let store = RecordingStore::default();
        store.inner.put("C", "index.html", Blob::new("<h1>root</h1>", "text/html"));
        store.inner.put(
            "C",
            "container/index.html",
            Blob::new("<h1>nested</h1>", "text/html"),
        );
        store.inner.put("C", "index.png", Blob::new(vec![0x89, b'P'], "image/png"));
        Arc::new(store)
    }

    fn handler(store: Arc<dyn BlobStore>) -> BlobHandler {
        BlobHandler::new(store, Some("index.html"))
    }

    async fn serve(handler: &BlobHandler, path: &str) -> BlobResult {
        handler
            .serve(&BlobRequest {
                method: "GET",
                container: "C",
                base_uri: BASE,
                path,
            })
            .await
    }

    fn assert_object(result: &BlobResult, expected_type: &str) {
        match result {
            BlobResult::ObjectBody { content_type, etag, .. } => {
                assert!(content_type.starts_with(expected_type), "{content_type}");
                assert!(etag.starts_with('"') && etag.ends_with('"'));
            }
            other => panic!("expected object body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_root_with_slash_serves_index() {
        let store = site();
        let result = serve(&handler(store.clone()), "/").await;
        assert_object(&result, "text/html");
        assert_eq!(*store.calls.lock(), vec!["get index.html"]);
    }

    #[tokio::test]
    async fn test_nested_directory_serves_index() {
        let result = serve(&handler(site()), "/container/").await;
        assert_object(&result, "text/html");
    }

    #[tokio::test]
    async fn test_bare_root_redirects_without_storage() {
        let store = site();
        store.inner.set_offline(true);
        let result = serve(&handler(store.clone()), "").await;
        assert_eq!(
            result,
            BlobResult::Redirect {
                url: "http://localhost/C/".to_string()
            }
        );
        assert!(store.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_existing_file_keeps_its_content_type() {
        let result = serve(&handler(site()), "/index.png").await;
        assert_object(&result, "image/png");
        assert_eq!(result.status_code(), 200);
    }

    #[tokio::test]
    async fn test_etag_is_uppercase_md5() {
        let result = serve(&handler(site()), "/index.html").await;
        let expected = crate::handler::result::format_etag(
            &Blob::new("<h1>root</h1>", "text/html").content_hash,
        );
        match result {
            BlobResult::ObjectBody { etag, .. } => {
                assert_eq!(etag, expected);
                assert_eq!(etag, etag.to_uppercase());
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let store = Arc::new(MemoryStore::new());
        store.create_container("C");
        let handler = handler(store);
        for path in ["/missing.html", "/missing/missing.html"] {
            assert_eq!(
                serve(&handler, path).await,
                BlobResult::Status(StatusMessage::NotFound)
            );
        }
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let store = site();
        let result = serve(&handler(store.clone()), "/container").await;
        assert_eq!(
            result,
            BlobResult::permanent_redirect("http://localhost/C/container/".to_string())
        );
        // Probe happens strictly after the primary fetch
        assert_eq!(
            *store.calls.lock(),
            vec!["get container", "exists container/index.html"]
        );
    }

    #[tokio::test]
    async fn test_missing_index_is_not_probed() {
        let store = site();
        let result = serve(&handler(store.clone()), "/docs/index.html").await;
        assert_eq!(result, BlobResult::Status(StatusMessage::NotFound));
        assert_eq!(*store.calls.lock(), vec!["get docs/index.html"]);
    }

    #[tokio::test]
    async fn test_missing_directory_index_is_not_probed() {
        let store = site();
        let result = serve(&handler(store.clone()), "/docs/").await;
        assert_eq!(result, BlobResult::Status(StatusMessage::NotFound));
        assert_eq!(store.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_without_index_name_nothing_is_substituted() {
        let store = site();
        let handler = BlobHandler::new(store.clone(), Some(""));
        assert_eq!(handler.index_name(), None);

        let result = serve(&handler, "/container").await;
        assert_eq!(result, BlobResult::Status(StatusMessage::NotFound));
        assert_eq!(*store.calls.lock(), vec!["get container"]);
    }

    #[tokio::test]
    async fn test_storage_outage_is_500() {
        let store = site();
        store.inner.set_offline(true);
        let result = serve(&handler(store), "/anything").await;
        assert_eq!(result, BlobResult::Status(StatusMessage::InternalServerError));
    }

    #[tokio::test]
    async fn test_missing_container_is_500() {
        let result = serve(&handler(Arc::new(MemoryStore::new())), "/missing").await;
        assert_eq!(result.status_code(), 500);
    }

    #[tokio::test]
    async fn test_probe_fault_is_500() {
        let result = serve(&handler(Arc::new(BrokenProbeStore)), "/container").await;
        assert_eq!(result, BlobResult::Status(StatusMessage::InternalServerError));
    }

    #[tokio::test]
    async fn test_unclassified_failure_is_500() {
        let result = serve(&handler(Arc::new(ConfusedStore)), "/index.html").await;
        assert_eq!(result, BlobResult::Status(StatusMessage::InternalServerError));
    }

    #[tokio::test]
    async fn test_served_object_logs_info_with_type_and_etag() {
        let (result, line) = serve_logged(&handler(site()), "/").await;
        assert_eq!(line.level, Level::INFO);
        assert_eq!(line.field("status"), "200");
        assert_eq!(line.field("path"), "/index.html");
        assert_eq!(line.field("content_type"), "text/html");
        let BlobResult::ObjectBody { etag, .. } = result else {
            panic!("expected an object body");
        };
        assert_eq!(line.field("etag"), etag);
    }

    #[tokio::test]
    async fn test_redirects_log_info_with_location() {
        let (_, line) = serve_logged(&handler(site()), "").await;
        assert_eq!(line.level, Level::INFO);
        assert_eq!(line.field("status"), "301");
        assert_eq!(line.field("location"), "http://localhost/C/");

        let (_, line) = serve_logged(&handler(site()), "/container").await;
        assert_eq!(line.level, Level::INFO);
        assert_eq!(line.field("status"), "301");
        assert_eq!(line.field("location"), "http://localhost/C/container/");
    }

    #[tokio::test]
    async fn test_not_found_logs_warning() {
        let (_, line) = serve_logged(&handler(site()), "/missing.html").await;
        assert_eq!(line.level, Level::WARN);
        assert_eq!(line.field("status"), "404");
        assert_eq!(line.field("path"), "/missing.html");
    }

    #[tokio::test]
    async fn test_storage_fault_logs_error_with_code() {
        let store = site();
        store.inner.set_offline(true);
        let (_, line) = serve_logged(&handler(store), "/index.html").await;
        assert_eq!(line.level, Level::ERROR);
        assert_eq!(line.field("status"), "500");
        assert_eq!(line.field("code"), "ServiceUnavailable");
        assert_eq!(line.field("reason"), "storage backend is offline");
    }

    #[tokio::test]
    async fn test_failed_existence_check_logs_error_with_code() {
        let (_, line) = serve_logged(&handler(Arc::new(BrokenProbeStore)), "/container").await;
        assert_eq!(line.level, Level::ERROR);
        assert_eq!(line.field("status"), "500");
        assert_eq!(line.field("code"), "AuthorizationFailure");
        assert_eq!(line.field("reason"), "denied");
    }

    #[tokio::test]
    async fn test_unclassified_failure_logs_error_with_category() {
        let (_, line) = serve_logged(&handler(Arc::new(ConfusedStore)), "/index.html").await;
        assert_eq!(line.level, Level::ERROR);
        assert_eq!(line.field("status"), "500");
        assert_eq!(line.field("category"), "transport");
        assert_eq!(line.field("reason"), "connection reset");
    }
}
