// Application state module
// Shared, read-only state handed to every request

use std::sync::Arc;

use super::types::Config;
use crate::handler::BlobHandler;
use crate::storage::BlobStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub blobs: BlobHandler,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn BlobStore>) -> Self {
        let blobs = BlobHandler::new(store, config.storage.index_name());
        Self { config, blobs }
    }
}
