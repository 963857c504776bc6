//! Unified error types for shellcache.
//!
//! Only `NetworkFailure` ever reaches a caller of the fetch path, and only for
//! classifications that have no substitute response. Store write failures are
//! swallowed by the engine; misses are plain `None` values.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for shellcache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The network fetch could not complete (transport error, timeout, oversized body).
    #[error("NETWORK_FAILURE: {0}")]
    NetworkFailure(String),

    /// No store entry for the requested key.
    #[error("STORE_MISS: {0}")]
    StoreMiss(String),

    /// Persisting an entry failed.
    #[error("STORE_WRITE_FAILURE: {0}")]
    StoreWriteFailure(String),

    /// Method or scheme excluded from caching.
    #[error("INVALID_REQUEST: {0}")]
    InvalidRequest(String),

    /// URL could not be parsed or resolved against the origin.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// App-shell pre-population failed; nothing was written.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// Lifecycle transition attempted from the wrong state.
    #[error("INVALID_STATE: {0}")]
    InvalidState(String),

    /// Invalid input parameters from the host.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A push, click or sync collaborator failed.
    #[error("HOOK_FAILED: {0}")]
    HookFailed(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
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

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(format!("json: {err}"))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::NetworkFailure(msg) => (-32000, msg.clone()),
            Error::StoreMiss(msg) => (-32001, msg.clone()),
            Error::StoreWriteFailure(msg) => (-32002, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::InvalidRequest(msg) => (-32004, msg.clone()),
            Error::InstallFailed(msg) => (-32005, msg.clone()),
            Error::InvalidState(msg) => (-32006, msg.clone()),
            Error::HookFailed(msg) => (-32007, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::StoreMiss("/style.css".to_string());
        assert!(err.to_string().contains("STORE_MISS"));
        assert!(err.to_string().contains("/style.css"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::StoreMiss("/style.css".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let mcp_err: McpError = Error::NetworkFailure("offline".into()).into();
        assert_eq!(mcp_err.code.0, -32000);
    }

    #[test]
    fn test_hook_failed_code() {
        let mcp_err: McpError = Error::HookFailed("open window: no client".into()).into();
        assert_eq!(mcp_err.code.0, -32007);
        assert_eq!(mcp_err.message, "open window: no client");
    }
}
