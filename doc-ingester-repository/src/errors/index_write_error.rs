//! Index write error types.
//!
//! This module defines the errors reported by index gateway writes.

use thiserror::Error;

/// Errors that can occur while writing to or deleting from the search index.
#[derive(Debug, Clone, Error)]
pub enum IndexWriteError {
    /// The index answered, but not with an outcome the operation accepts.
    #[error("{operation} rejected by index with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A bulk operation removed only some of the matching documents.
    #[error("{operation} failed for {failed} of {total} documents: {body}")]
    Partial {
        operation: &'static str,
        status: u16,
        total: u64,
        failed: u64,
        body: String,
    },

    /// The request never produced a usable response (connection, timeout).
    #[error("{operation} request failed: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },
}

impl IndexWriteError {
    /// Create a rejected-outcome error.
    pub fn rejected(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            reason: reason.into(),
        }
    }

    /// The HTTP status reported by the index, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Partial { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// The response body reported by the index, if a response was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } | Self::Partial { body, .. } => Some(body),
            Self::Transport { .. } => None,
        }
    }

    /// Whether the index reported the target document as missing.
    ///
    /// Deletes are not idempotent on absence; callers that want them to be
    /// can check this before treating the error as fatal.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_carries_status_and_body() {
        let err = IndexWriteError::rejected("delete", 404, r#"{"result":"not_found"}"#);

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(r#"{"result":"not_found"}"#));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            r#"delete rejected by index with status 404: {"result":"not_found"}"#
        );
    }

    #[test]
    fn test_transport_has_no_status() {
        let err = IndexWriteError::transport("upsert", "connection refused");

        assert!(err.status().is_none());
        assert!(err.body().is_none());
        assert!(!err.is_not_found());
    }
}
