//! Unified error types for linkpeek.
//!
//! Every variant carries a stable code prefix so log lines and tool errors
//! can be matched without parsing the free-form detail.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error type shared by the store, fetcher, extractor and server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty text).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Any failure while retrieving a page: DNS, connect, timeout,
    /// non-success status, oversized or unreadable body.
    #[error("FETCH_FAILED: {0}")]
    FetchFailed(String),

    /// Content extraction failed.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// The database file was written by a newer schema version.
    #[error("CACHE_ERROR: unsupported schema: {0}")]
    UnsupportedSchema(String),

    /// A stored value could not be decoded or failed shape validation.
    #[error("CACHE_CORRUPT: {0}")]
    CacheCorrupt(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::ExtractFailed(msg) => (-32000, msg.clone()),
            Error::FetchFailed(msg) => (-32008, msg.clone()),
            Error::CacheCorrupt(msg) => (-32002, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::UnsupportedSchema(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
