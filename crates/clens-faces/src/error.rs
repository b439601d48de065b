//! Face client error types.

use thiserror::Error;

/// Result type for face-attribute operations.
pub type FaceResult<T> = Result<T, FaceError>;

/// Errors that can occur while classifying a face crop.
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("Failed to configure face client: {0}")]
    ConfigError(String),

    #[error("Face detection call failed: {0}")]
    Service(String),

    #[error("Face detection returned an unusable result: {0}")]
    InvalidResponse(String),
}

impl FaceError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }
}
