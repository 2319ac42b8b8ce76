//! Built-in extraction engine.
//!
//! Uses pdf-extract for PDF files and passes UTF-8 text through unchanged.
//! Anything else is reported as unsupported.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::EngineError;
use crate::interfaces::{EngineOutput, ExtractedMetadata, Extraction, ExtractionEngine};

const PDF_MAGIC: &[u8] = b"%PDF-";
const MIME_PDF: &str = "application/pdf";
const MIME_TEXT: &str = "text/plain";
const MIME_UNKNOWN: &str = "application/octet-stream";

/// Extraction engine backed by pdf-extract.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinExtractionEngine;

impl BuiltinExtractionEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExtractionEngine for BuiltinExtractionEngine {
    async fn extract(
        &self,
        bytes: &[u8],
        limit: Option<usize>,
    ) -> Result<Extraction, EngineError> {
        let (text, content_type) = if bytes.starts_with(PDF_MAGIC) {
            // pdf-extract is CPU bound and synchronous
            let owned = bytes.to_vec();
            let text = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&owned).map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| EngineError::failed(format!("extraction task failed: {e}")))?
            .map_err(EngineError::Failed)?;
            (text, MIME_PDF)
        } else {
            match std::str::from_utf8(bytes) {
                Ok(text) => (text.to_string(), MIME_TEXT),
                Err(_) => return Err(EngineError::UnsupportedType(MIME_UNKNOWN.to_string())),
            }
        };

        debug!(content_type, chars = text.chars().count(), "Extracted text");

        let metadata = ExtractedMetadata {
            title: None,
            content_type: Some(content_type.to_string()),
        };
        Ok(apply_limit(text, metadata, limit))
    }
}

/// Cut `text` to at most `limit` characters, reporting a soft limit when
/// anything was dropped.
fn apply_limit(text: String, metadata: ExtractedMetadata, limit: Option<usize>) -> Extraction {
    let cut = limit.and_then(|limit| text.char_indices().nth(limit).map(|(idx, _)| idx));

    match cut {
        Some(idx) => Extraction::SoftLimitReached(EngineOutput {
            text: text[..idx].to_string(),
            metadata,
        }),
        None => Extraction::Complete(EngineOutput { text, metadata }),
    }
}
