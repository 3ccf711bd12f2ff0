//! Request handler module
//!
//! `router` turns an HTTP request into a blob request; `blob` decides how to
//! answer it; `result` holds the possible answers.

pub mod blob;
pub mod result;
pub mod router;

// Re-export main entry point
pub use blob::{BlobHandler, BlobRequest};
pub use result::{BlobResult, StatusMessage};
pub use router::handle_request;
