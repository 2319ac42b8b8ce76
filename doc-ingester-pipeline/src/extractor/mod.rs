//! Extractor module for the document ingester pipeline.
//!
//! Wraps the external extraction engine: decodes a document's `file_base64`,
//! extracts its text and folds the result back into the document.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, instrument, warn};

use crate::errors::IngestError;
use crate::normalizer::collapse_whitespace;
use doc_ingester_repository::{EngineError, ExtractionEngine};
use doc_ingester_shared::Document;

/// Configuration for the content extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Character limit passed to the engine; `None` for unbounded.
    pub char_limit: Option<usize>,
    /// Upper bound for a single extraction.
    pub timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            char_limit: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Text and title extracted from raw file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub title: Option<String>,
    /// The engine stopped at its character limit.
    pub truncated: bool,
}

/// Extracts text from raw file bytes through an [`ExtractionEngine`].
pub struct ContentExtractor {
    engine: Arc<dyn ExtractionEngine>,
    config: ExtractorConfig,
}

impl ContentExtractor {
    pub fn new(engine: Arc<dyn ExtractionEngine>) -> Self {
        Self::with_config(engine, ExtractorConfig::default())
    }

    pub fn with_config(engine: Arc<dyn ExtractionEngine>, config: ExtractorConfig) -> Self {
        Self { engine, config }
    }

    /// Extract text and an optional title from raw bytes.
    ///
    /// Reaching the engine's character limit is a soft success: the partial
    /// text is returned with `truncated` set. Every other engine failure,
    /// timeouts included, is an [`IngestError::Extraction`].
    pub async fn extract(&self, bytes: &[u8]) -> Result<ExtractedContent, IngestError> {
        let extraction = tokio::time::timeout(
            self.config.timeout,
            self.engine.extract(bytes, self.config.char_limit),
        )
        .await
        .map_err(|_| {
            IngestError::extraction(EngineError::Timeout(self.config.timeout).to_string())
        })?
        .map_err(|e| IngestError::extraction(e.to_string()))?;

        let truncated = extraction.is_truncated();
        let output = extraction.into_output();

        Ok(ExtractedContent {
            text: output.text,
            title: output.metadata.title,
            truncated,
        })
    }

    /// Replace a document's content with text extracted from its file.
    ///
    /// `file_base64` is always cleared, whatever the outcome. Collapsed text
    /// replaces `content` only when non-empty, and a non-empty extracted
    /// title replaces `title`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the engine truncated its output
    /// * `Ok(false)` - If extraction was complete or there was no file
    /// * `Err(IngestError::Extraction)` - If decoding or extraction failed
    #[instrument(skip(self, document), fields(id = %document.id_str()))]
    pub async fn apply(&self, document: &mut Document) -> Result<bool, IngestError> {
        let has_file = document.has_file();
        let Some(encoded) = document.file_base64.take().filter(|_| has_file) else {
            return Ok(false);
        };

        let bytes = decode_file(&encoded)?;
        let extracted = self.extract(&bytes).await?;

        if extracted.truncated {
            warn!(
                id = %document.id_str(),
                limit = ?self.config.char_limit,
                "Extraction stopped at character limit; indexing partial text"
            );
        }

        let text = collapse_whitespace(&extracted.text);
        if !text.is_empty() {
            document.content = Some(text);
        }
        if let Some(title) = extracted.title.filter(|t| !t.trim().is_empty()) {
            document.title = Some(title);
        }

        debug!(
            bytes = bytes.len(),
            truncated = extracted.truncated,
            "Extracted file content"
        );
        Ok(extracted.truncated)
    }
}

/// Decode base64 file content, tolerating line breaks from MIME encoders.
fn decode_file(encoded: &str) -> Result<Vec<u8>, IngestError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| IngestError::extraction(format!("file_base64 is not valid base64: {e}")))
}
