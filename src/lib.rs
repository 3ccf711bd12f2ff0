//! Static website hosting for object-storage containers.
//!
//! Requests of the form `/<container>/<path>` are resolved against a
//! [`storage::BlobStore`]: directory paths get the configured index
//! document, directory-like paths without a trailing slash are redirected
//! to their canonical form, and storage failures become plain-text errors.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod server;
pub mod storage;
