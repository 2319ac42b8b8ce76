//! OpenSearch gateway implementation.
//!
//! This module provides the concrete implementation of `IndexGateway`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    DeleteByQueryParts, DeleteParts, IndexParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::GatewayConfig;
use crate::errors::IndexWriteError;
use crate::interfaces::{IndexGateway, WriteOutcome};
use crate::opensearch::index_config::document_index_settings;
use crate::opensearch::queries::children_of;
use doc_ingester_shared::Document;

const UPSERT: &str = "upsert";
const DELETE: &str = "delete";
const DELETE_BY_PARENT: &str = "delete_by_parent_id";
const ENSURE_INDEX: &str = "ensure_index";

/// OpenSearch index gateway.
///
/// Every request is bounded by the configured request timeout.
///
/// # Example
///
/// ```ignore
/// let gateway = OpenSearchGateway::new("http://localhost:9200", GatewayConfig::default())?;
/// gateway.upsert("search", "doc-1", &document).await?;
/// ```
pub struct OpenSearchGateway {
    client: OpenSearch,
}

impl OpenSearchGateway {
    /// Create a new gateway connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `config` - Gateway configuration (request timeout)
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchGateway)` - A new gateway instance
    /// * `Err(IndexWriteError)` - If the URL is invalid or transport setup fails
    pub fn new(url: &str, config: GatewayConfig) -> Result<Self, IndexWriteError> {
        let parsed_url =
            Url::parse(url).map_err(|e| IndexWriteError::transport("connect", e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| IndexWriteError::transport("connect", e.to_string()))?;

        info!(
            url = %url,
            timeout_ms = config.request_timeout.as_millis() as u64,
            "Created OpenSearch gateway"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Create `index` with the document mappings if it does not exist yet.
    #[instrument(skip(self))]
    pub async fn ensure_index(&self, index: &str) -> Result<(), IndexWriteError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| IndexWriteError::transport(ENSURE_INDEX, e.to_string()))?;

        if response.status_code().is_success() {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(document_index_settings())
            .send()
            .await
            .map_err(|e| IndexWriteError::transport(ENSURE_INDEX, e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Another worker may have created it in the meantime.
            if body.contains("resource_already_exists_exception") {
                return Ok(());
            }
            error!(index = %index, status = %status, body = %body, "Index creation failed");
            return Err(IndexWriteError::rejected(ENSURE_INDEX, status.as_u16(), body));
        }

        info!(index = %index, "Created index");
        Ok(())
    }
}

#[async_trait]
impl IndexGateway for OpenSearchGateway {
    /// Index a document, accepting both the `created` and `updated` results.
    async fn upsert(
        &self,
        index: &str,
        id: &str,
        document: &Document,
    ) -> Result<WriteOutcome, IndexWriteError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(document)
            .send()
            .await
            .map_err(|e| IndexWriteError::transport(UPSERT, e.to_string()))?;

        let status = response.status_code().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IndexWriteError::transport(UPSERT, e.to_string()))?;

        let outcome = parse_upsert_response(status, &body)?;
        debug!(index = %index, id = %id, outcome = ?outcome, "Document indexed");
        Ok(outcome)
    }

    /// Delete a document, accepting only the `deleted` result.
    async fn delete(&self, index: &str, id: &str) -> Result<(), IndexWriteError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| IndexWriteError::transport(DELETE, e.to_string()))?;

        let status = response.status_code().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IndexWriteError::transport(DELETE, e.to_string()))?;

        parse_delete_response(status, &body)?;
        debug!(index = %index, id = %id, "Document deleted");
        Ok(())
    }

    /// Delete all resources of a parent with a single delete-by-query.
    ///
    /// Missing indexes are skipped, so the first composite upsert into a new
    /// index finds zero resources rather than failing.
    async fn delete_by_parent_id(
        &self,
        index: &str,
        parent_id: &str,
    ) -> Result<u64, IndexWriteError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[index]))
            .ignore_unavailable(true)
            .refresh(true)
            .body(children_of(parent_id))
            .send()
            .await
            .map_err(|e| IndexWriteError::transport(DELETE_BY_PARENT, e.to_string()))?;

        let status = response.status_code().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IndexWriteError::transport(DELETE_BY_PARENT, e.to_string()))?;

        let deleted = parse_delete_by_query_response(status, &body)?;
        debug!(index = %index, parent_id = %parent_id, deleted, "Resources deleted");
        Ok(deleted)
    }
}

/// Read the `result` field of a single-document write response.
fn write_result(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("result")?
        .as_str()
        .map(str::to_string)
}

fn parse_upsert_response(status: u16, body: &str) -> Result<WriteOutcome, IndexWriteError> {
    match write_result(body).as_deref() {
        Some("created") => Ok(WriteOutcome::Created),
        Some("updated") => Ok(WriteOutcome::Updated),
        _ => {
            error!(status, body = %body, "Index response was not created or updated");
            Err(IndexWriteError::rejected(UPSERT, status, body))
        }
    }
}

fn parse_delete_response(status: u16, body: &str) -> Result<(), IndexWriteError> {
    match write_result(body).as_deref() {
        Some("deleted") => Ok(()),
        _ => Err(IndexWriteError::rejected(DELETE, status, body)),
    }
}

fn parse_delete_by_query_response(status: u16, body: &str) -> Result<u64, IndexWriteError> {
    if status == 404 && body.contains("index_not_found_exception") {
        return Ok(0);
    }
    if !(200..300).contains(&status) {
        error!(status, body = %body, "Delete by parent request failed");
        return Err(IndexWriteError::rejected(DELETE_BY_PARENT, status, body));
    }

    let parsed: Value = serde_json::from_str(body)
        .map_err(|_| IndexWriteError::rejected(DELETE_BY_PARENT, status, body))?;

    let total = parsed.get("total").and_then(Value::as_u64).unwrap_or(0);
    let deleted = parsed.get("deleted").and_then(Value::as_u64).unwrap_or(0);
    let failed = parsed
        .get("failures")
        .and_then(Value::as_array)
        .map(|failures| failures.len() as u64)
        .unwrap_or(0);

    if failed > 0 {
        return Err(IndexWriteError::Partial {
            operation: DELETE_BY_PARENT,
            status,
            total,
            failed,
            body: body.to_string(),
        });
    }

    Ok(deleted)
}
