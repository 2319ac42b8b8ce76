//! Extraction engine trait definition.

use async_trait::async_trait;

use crate::errors::EngineError;

/// Metadata an engine may report alongside the extracted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub title: Option<String>,
    pub content_type: Option<String>,
}

/// Text and metadata produced by an engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub text: String,
    pub metadata: ExtractedMetadata,
}

/// Successful extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The whole input was extracted.
    Complete(EngineOutput),
    /// The engine stopped at its character limit; the output holds what was
    /// produced up to that point.
    SoftLimitReached(EngineOutput),
}

impl Extraction {
    pub fn output(&self) -> &EngineOutput {
        match self {
            Extraction::Complete(output) | Extraction::SoftLimitReached(output) => output,
        }
    }

    pub fn into_output(self) -> EngineOutput {
        match self {
            Extraction::Complete(output) | Extraction::SoftLimitReached(output) => output,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Extraction::SoftLimitReached(_))
    }
}

/// Turns arbitrary file bytes into plain text.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Extract text from `bytes`.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw file content
    /// * `limit` - Maximum number of characters to produce, `None` for unbounded
    async fn extract(&self, bytes: &[u8], limit: Option<usize>)
        -> Result<Extraction, EngineError>;
}
