//! Error types for the document ingester pipeline.
//!
//! Every error is fatal to the current event only. Nothing here is retried;
//! the surrounding consumer decides redelivery from [`IngestError::kind`].

use std::fmt;

use doc_ingester_repository::IndexWriteError;
use doc_ingester_shared::{PayloadRef, UnknownVerb};
use thiserror::Error;

use crate::validator::FieldViolation;

/// Errors that can fail an event.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The out-of-line payload is missing or unreadable.
    #[error("Payload fetch error for {location}: {reason}")]
    PayloadFetch { location: PayloadRef, reason: String },

    /// The out-of-line payload is not a valid event body.
    #[error("Payload decode error for {location}: {reason}")]
    PayloadDecode { location: PayloadRef, reason: String },

    /// Text extraction failed. Soft truncation never produces this.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The document broke one or more validation rules.
    #[error("Validation error: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// The index rejected a write.
    #[error("Index write error: {0}")]
    IndexWrite(#[from] IndexWriteError),

    /// The event carries a verb other than upsert or delete.
    #[error("Unknown verb: expected 'upsert' or 'delete' but got '{0}'")]
    UnknownVerb(String),
}

/// Error category, for consumers deciding on redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PayloadFetch,
    PayloadDecode,
    Extraction,
    Validation,
    IndexWrite,
    UnknownVerb,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PayloadFetch => "payload_fetch",
            ErrorKind::PayloadDecode => "payload_decode",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Validation => "validation",
            ErrorKind::IndexWrite => "index_write",
            ErrorKind::UnknownVerb => "unknown_verb",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IngestError {
    /// Create a payload fetch error.
    pub fn payload_fetch(location: &PayloadRef, reason: impl Into<String>) -> Self {
        Self::PayloadFetch {
            location: location.clone(),
            reason: reason.into(),
        }
    }

    /// Create a payload decode error.
    pub fn payload_decode(location: &PayloadRef, reason: impl Into<String>) -> Self {
        Self::PayloadDecode {
            location: location.clone(),
            reason: reason.into(),
        }
    }

    /// Create an extraction error.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PayloadFetch { .. } => ErrorKind::PayloadFetch,
            Self::PayloadDecode { .. } => ErrorKind::PayloadDecode,
            Self::Extraction(_) => ErrorKind::Extraction,
            Self::Validation(_) => ErrorKind::Validation,
            Self::IndexWrite(_) => ErrorKind::IndexWrite,
            Self::UnknownVerb(_) => ErrorKind::UnknownVerb,
        }
    }
}

impl From<UnknownVerb> for IngestError {
    fn from(err: UnknownVerb) -> Self {
        Self::UnknownVerb(err.0)
    }
}

/// Errors that stop the consumer loop itself, as opposed to one event.
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// The input could not be read.
    #[error("Consumer input error: {0}")]
    Io(String),

    /// The receiving side of the message channel is gone.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_violation() {
        let err = IngestError::Validation(vec![
            FieldViolation::new("id", "is required"),
            FieldViolation::new("site", "is required"),
        ]);

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "Validation error: id: is required; site: is required"
        );
    }

    #[test]
    fn test_unknown_verb_conversion() {
        let err: IngestError = UnknownVerb("spike".to_string()).into();

        assert_eq!(err.kind(), ErrorKind::UnknownVerb);
        assert!(err.to_string().contains("spike"));
    }

    #[test]
    fn test_index_write_conversion_keeps_status() {
        let err: IngestError = IndexWriteError::rejected("upsert", 400, "bad").into();

        assert_eq!(err.kind(), ErrorKind::IndexWrite);
        match err {
            IngestError::IndexWrite(inner) => assert_eq!(inner.status(), Some(400)),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
