//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for a document index.

use serde_json::{json, Value};

/// Get the index settings and mappings for a document index.
///
/// The configuration includes:
/// - **Keyword fields**: ids, site and parent links, for filtering and the
///   exact `parent_id` match used when replacing a composite's resources
/// - **Text fields**: title and content for full-text search
/// - **Date field**: `published`
pub fn document_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "site": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "fields": {
                        "raw": { "type": "keyword" }
                    }
                },
                "keywords": {
                    "properties": {
                        "vocab": { "type": "keyword" },
                        "value": { "type": "keyword" }
                    }
                },
                "content": { "type": "text" },
                "content_truncated": { "type": "text", "index": false },
                "url": { "type": "keyword", "index": false },
                "data_type": { "type": "keyword" },
                "published": {
                    "type": "date",
                    "format": "strict_date_optional_time||yyyy-MM-dd"
                },
                "parent_id": { "type": "keyword" },
                "parent_title": { "type": "text" }
            }
        }
    })
}
