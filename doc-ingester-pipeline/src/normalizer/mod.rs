//! Normalizer module for the document ingester pipeline.
//!
//! Collapses whitespace in extracted text and derives `content_truncated`,
//! the field search results show when no query-time highlight is available.

use doc_ingester_shared::Document;

/// Default number of characters kept in `content_truncated`.
pub const DEFAULT_TRUNCATE_LENGTH: usize = 200;

/// Appended to `content_truncated` when content was cut.
pub const TRUNCATION_MARKER: &str = "...";

/// Collapse every run of whitespace (newlines included) to a single space
/// and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives display fields from document content.
#[derive(Debug, Clone)]
pub struct DocumentNormalizer {
    truncate_length: usize,
    marker: String,
}

impl Default for DocumentNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TRUNCATE_LENGTH, TRUNCATION_MARKER)
    }
}

impl DocumentNormalizer {
    pub fn new(truncate_length: usize, marker: impl Into<String>) -> Self {
        Self {
            truncate_length,
            marker: marker.into(),
        }
    }

    /// Compute the display value for `content`.
    ///
    /// The content is collapsed first, so the result never contains newlines
    /// and is at most `truncate_length` characters plus the marker.
    pub fn truncate(&self, content: &str) -> String {
        let collapsed = collapse_whitespace(content);

        match collapsed.char_indices().nth(self.truncate_length) {
            Some((idx, _)) => format!("{}{}", &collapsed[..idx], self.marker),
            None => collapsed,
        }
    }

    /// Recompute `content_truncated` from the current content.
    ///
    /// Any earlier value is replaced; the field is cleared when there is no
    /// content left after collapsing whitespace.
    pub fn apply(&self, document: &mut Document) {
        document.content_truncated = document
            .content
            .as_deref()
            .map(|content| self.truncate(content))
            .filter(|truncated| !truncated.is_empty());
    }
}
