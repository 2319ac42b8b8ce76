//! Object store error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while reading or deleting out-of-line payloads.
#[derive(Debug, Clone, Error)]
pub enum ObjectStoreError {
    /// No object exists at the given location.
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The object exists but could not be read or removed.
    #[error("Object store IO error: {0}")]
    Io(String),

    /// The call did not finish within the configured timeout.
    #[error("Object store call timed out after {0:?}")]
    Timeout(Duration),
}

impl ObjectStoreError {
    /// Create a not found error.
    pub fn not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create an IO error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}
