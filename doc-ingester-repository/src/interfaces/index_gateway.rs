//! Index gateway trait definition.
//!
//! This module defines the abstract interface for single-document writes
//! against a search index, allowing for different backend implementations.

use async_trait::async_trait;

use crate::errors::IndexWriteError;
use doc_ingester_shared::Document;

/// Outcome of a successful upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
}

/// Abstracts the search index the ingester writes to.
///
/// Implementations are injected into the pipeline at construction time. All
/// implementations must be `Send + Sync` so one handle can serve concurrent
/// workers.
#[async_trait]
pub trait IndexGateway: Send + Sync {
    /// Index a document under the given id, replacing any existing one.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name
    /// * `id` - Document id within the index
    /// * `document` - The document body to store
    ///
    /// # Returns
    ///
    /// * `Ok(WriteOutcome)` - If the index reported the document as created or updated
    /// * `Err(IndexWriteError)` - For any other outcome, carrying status and body
    async fn upsert(
        &self,
        index: &str,
        id: &str,
        document: &Document,
    ) -> Result<WriteOutcome, IndexWriteError>;

    /// Delete a document by id.
    ///
    /// A missing document is reported as an error (status 404); this method
    /// does not swallow "not found".
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name
    /// * `id` - Document id within the index
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index reported the document as deleted
    /// * `Err(IndexWriteError)` - For any other outcome
    async fn delete(&self, index: &str, id: &str) -> Result<(), IndexWriteError>;

    /// Delete every document whose `parent_id` equals `parent_id`.
    ///
    /// Partial failure (some children deleted, some not) is reported as a
    /// single aggregate error; nothing is retried per document.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The number of documents deleted
    /// * `Err(IndexWriteError)` - If the operation failed in whole or in part
    async fn delete_by_parent_id(&self, index: &str, parent_id: &str)
        -> Result<u64, IndexWriteError>;
}
