//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur against the analytics table.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to configure analytics store: {0}")]
    ConfigError(String),

    #[error("Counter update failed: {0}")]
    WriteFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl StoreError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }
}
