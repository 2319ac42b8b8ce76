//! Document model.
//!
//! Defines the structure of documents stored in the search index, as they
//! appear on the wire and in the index body.

use serde::{Deserialize, Serialize};

/// Site tag marking a composite document that owns dependent resources.
pub const COMPOSITE_SITE: &str = "datahub";

/// A vocabulary keyword attached to a document.
///
/// Keywords are opaque to the ingester and are passed through unchanged,
/// including incomplete ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The indexable unit.
///
/// Field names are snake_case on the wire. Absent fields stay absent when the
/// document is serialized for the index, so `file_base64` never reaches the
/// index once it has been consumed by extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier. Required for every index write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Classification tag; [`COMPOSITE_SITE`] marks a composite document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<Keyword>>,
    /// Full extracted or authored text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Display field derived from `content`. Never read from the wire.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub content_truncated: Option<String>,
    /// Raw file bytes, base64 encoded. Older producers send `content_base64`.
    #[serde(
        default,
        alias = "content_base64",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    /// Set only on resources derived from a composite document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_title: Option<String>,
}

impl Document {
    /// The document id, or an empty string when unset.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// The site tag, or an empty string when unset.
    pub fn site_str(&self) -> &str {
        self.site.as_deref().unwrap_or_default()
    }

    /// Whether this document is tagged with the given composite site.
    pub fn is_composite(&self, composite_site: &str) -> bool {
        self.site.as_deref() == Some(composite_site)
    }

    /// Whether the document carries raw file bytes awaiting extraction.
    pub fn has_file(&self) -> bool {
        self.file_base64.as_deref().is_some_and(|f| !f.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_document() {
        let json = r#"{
            "id": "doc-1",
            "site": "datahub",
            "title": "Habitat map",
            "keywords": [{"vocab": "jncc-web-tags", "value": "Seabed"}],
            "content": "Some text",
            "url": "https://example.org/doc-1",
            "data_type": "Dataset",
            "published": "2020-01-01"
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();

        assert_eq!(doc.id_str(), "doc-1");
        assert!(doc.is_composite(COMPOSITE_SITE));
        assert_eq!(doc.keywords.as_ref().map(Vec::len), Some(1));
        assert_eq!(doc.data_type.as_deref(), Some("Dataset"));
        assert!(!doc.has_file());
    }

    #[test]
    fn test_content_truncated_is_not_externally_settable() {
        let json = r#"{"id": "a", "site": "web", "content_truncated": "stale"}"#;

        let doc: Document = serde_json::from_str(json).unwrap();

        assert!(doc.content_truncated.is_none());
    }

    #[test]
    fn test_legacy_content_base64_alias() {
        let json = r#"{"id": "a", "site": "web", "content_base64": "aGVsbG8="}"#;

        let doc: Document = serde_json::from_str(json).unwrap();

        assert_eq!(doc.file_base64.as_deref(), Some("aGVsbG8="));
        assert!(doc.has_file());
    }

    #[test]
    fn test_absent_fields_are_not_serialized() {
        let doc = Document {
            id: Some("a".to_string()),
            site: Some("web".to_string()),
            content_truncated: Some("short".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&doc).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert!(!object.contains_key("file_base64"));
        assert_eq!(object["content_truncated"], "short");
    }

    #[test]
    fn test_incomplete_keywords_pass_through() {
        let json = r#"{
            "id": "a",
            "site": "web",
            "keywords": [{"value": "Seabed"}, {"vocab": "jncc-web-tags", "value": null}]
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        let keywords = doc.keywords.clone().unwrap();
        assert_eq!(keywords[0].vocab, None);
        assert_eq!(keywords[0].value.as_deref(), Some("Seabed"));
        assert_eq!(keywords[1].value, None);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value["keywords"],
            serde_json::json!([{"value": "Seabed"}, {"vocab": "jncc-web-tags"}])
        );
    }
}
