//! OpenSearch query builders.

use serde_json::{json, Value};

/// Build a query matching every resource that points at `parent_id`.
///
/// `parent_id` is mapped as a keyword, so a `term` query matches the id
/// exactly rather than any analysed fragment of it.
pub fn children_of(parent_id: &str) -> Value {
    json!({
        "query": {
            "term": {
                "parent_id": parent_id
            }
        }
    })
}
