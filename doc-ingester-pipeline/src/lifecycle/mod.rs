//! Lifecycle module for the document ingester pipeline.
//!
//! A composite document owns a set of resource documents stored in the same
//! index and linked back through `parent_id`. Every upsert of the parent
//! replaces the whole set: existing resources are deleted, then the incoming
//! ones are written with fresh identities.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::IngestError;
use crate::normalizer::DocumentNormalizer;
use doc_ingester_repository::IndexGateway;
use doc_ingester_shared::Document;

/// Replaces and removes the resources of composite documents.
pub struct ResourceLifecycleManager {
    gateway: Arc<dyn IndexGateway>,
    normalizer: DocumentNormalizer,
    composite_site: String,
}

impl ResourceLifecycleManager {
    pub fn new(
        gateway: Arc<dyn IndexGateway>,
        normalizer: DocumentNormalizer,
        composite_site: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            normalizer,
            composite_site: composite_site.into(),
        }
    }

    /// Whether the document owns resources.
    pub fn applies_to(&self, document: &Document) -> bool {
        document.is_composite(&self.composite_site)
    }

    /// Delete every resource of `parent_id` from the index.
    ///
    /// Deleting resources of a parent that has none is not an error.
    #[instrument(skip(self))]
    pub async fn delete_existing_resources(
        &self,
        index: &str,
        parent_id: &str,
    ) -> Result<u64, IngestError> {
        let deleted = self.gateway.delete_by_parent_id(index, parent_id).await?;
        debug!(deleted, "Deleted existing resources");
        Ok(deleted)
    }

    /// Write `resources` as children of `parent`.
    ///
    /// Each resource gets a new random id (also used as its url) and inherits
    /// the parent's site, id and title. Writes are issued one at a time in
    /// input order; the first failure stops the loop.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - The generated resource ids, in input order
    /// * `Err(IngestError::IndexWrite)` - If any resource write was rejected
    #[instrument(
        skip(self, parent, resources),
        fields(parent_id = %parent.id_str(), count = resources.len())
    )]
    pub async fn upsert_resources(
        &self,
        index: &str,
        parent: &Document,
        resources: Vec<Document>,
    ) -> Result<Vec<String>, IngestError> {
        let mut ids = Vec::with_capacity(resources.len());

        for resource in resources {
            let resource = self.adopt(parent, resource);
            let id = resource.id_str().to_string();
            self.gateway.upsert(index, &id, &resource).await?;
            ids.push(id);
        }

        info!(written = ids.len(), "Wrote composite resources");
        Ok(ids)
    }

    fn adopt(&self, parent: &Document, mut resource: Document) -> Document {
        let id = Uuid::new_v4().to_string();
        resource.url = Some(id.clone());
        resource.id = Some(id);
        resource.site = parent.site.clone();
        resource.parent_id = parent.id.clone();
        resource.parent_title = parent.title.clone();
        resource.file_base64 = None;
        self.normalizer.apply(&mut resource);
        resource
    }
}
