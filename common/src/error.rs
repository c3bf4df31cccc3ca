use thiserror::Error;

use crate::job::JobId;

/// Failure to obtain a page from the remote feed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("invalid page number {0}: pages start at 1")]
    InvalidPage(u32),

    #[error("request for page {page} failed: {message}")]
    Transport { page: u32, message: String },

    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },

    #[error("page {page} returned a malformed body: {message}")]
    Malformed { page: u32, message: String },
}

/// Failure to resolve a single job for the detail view.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Failure reading or writing a bookmark backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bookmark storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("bookmark data could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("bookmark backend failed: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
