//! Extraction engine error types.

use std::time::Duration;

use thiserror::Error;

/// Hard failures of the text extraction engine.
///
/// Stopping early at the character limit is not an error; engines report it
/// as [`crate::Extraction::SoftLimitReached`].
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The bytes are in a format the engine cannot read.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// The engine recognised the format but could not extract it.
    #[error("extraction failed: {0}")]
    Failed(String),

    /// Extraction did not finish within the configured timeout.
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
}

impl EngineError {
    /// Create a failed extraction error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::UnsupportedType("application/octet-stream".to_string());
        assert_eq!(
            err.to_string(),
            "unsupported content type: application/octet-stream"
        );

        let err = EngineError::failed("PDF parsing crashed");
        assert_eq!(err.to_string(), "extraction failed: PDF parsing crashed");
    }
}
