//! Outcomes of serving a blob request

use crate::storage::Blob;
use bytes::Bytes;
use std::fmt;

/// What the handler decided to send back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobResult {
    /// The object itself
    ObjectBody {
        content: Bytes,
        content_type: String,
        etag: String,
    },
    /// Permanent (301) redirect to an absolute URL
    Redirect { url: String },
    /// Status code with its fixed plain-text message
    Status(StatusMessage),
}

impl BlobResult {
    pub fn object(blob: Blob) -> Self {
        Self::ObjectBody {
            etag: format_etag(&blob.content_hash),
            content: blob.content,
            content_type: blob.content_type,
        }
    }

    pub const fn permanent_redirect(url: String) -> Self {
        Self::Redirect { url }
    }

    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ObjectBody { .. } => 200,
            Self::Redirect { .. } => 301,
            Self::Status(status) => status.code(),
        }
    }
}

/// Quoted uppercase hex of a content hash, e.g. `"5D41402A..."`
pub fn format_etag(content_hash: &[u8]) -> String {
    format!("\"{}\"", hex::encode_upper(content_hash))
}

/// Error statuses the handler can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    NotFound,
    InternalServerError,
}

impl StatusMessage {
    pub const fn code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InternalServerError => 500,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::NotFound => "404 Not Found",
            Self::InternalServerError => "500 Internal Server Error",
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("status code {0} not known")]
pub struct UnknownStatusCode(pub u16);

impl TryFrom<u16> for StatusMessage {
    type Error = UnknownStatusCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            404 => Ok(Self::NotFound),
            500 => Ok(Self::InternalServerError),
            other => Err(UnknownStatusCode(other)),
        }
    }
}
