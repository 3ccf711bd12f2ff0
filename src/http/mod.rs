//! HTTP protocol layer module
//!
//! Response construction and content-type detection, kept apart from the
//! serving decisions made in `handler`.

pub mod mime;
pub mod response;

pub use response::{build_405_response, build_result_response};
