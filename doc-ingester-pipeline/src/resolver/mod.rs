//! Resolver module for the document ingester pipeline.
//!
//! Producers may store large event bodies in object storage and send only
//! a reference on the queue. The resolver swaps such a reference for the
//! stored document and resources, and removes the object once the event
//! has been applied.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::errors::IngestError;
use doc_ingester_repository::ObjectStore;
use doc_ingester_shared::{Event, EventBody, PayloadRef};

/// Fetches and cleans up out-of-line event bodies.
pub struct PayloadResolver {
    store: Arc<dyn ObjectStore>,
}

impl PayloadResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Replace the event's document and resources with the stored body.
    ///
    /// Events without a payload reference are returned unchanged. The
    /// reference is kept on the returned event so it can be cleaned up
    /// after a successful write.
    ///
    /// # Returns
    ///
    /// * `Ok(Event)` - The event with its body filled in
    /// * `Err(IngestError::PayloadFetch)` - If the object is missing or unreadable
    /// * `Err(IngestError::PayloadDecode)` - If the object is not a valid body
    #[instrument(skip(self, event), fields(index = %event.index, verb = %event.verb))]
    pub async fn resolve(&self, mut event: Event) -> Result<Event, IngestError> {
        let Some(location) = event.payload_ref.clone() else {
            return Ok(event);
        };

        let bytes = self
            .store
            .get(&location.bucket, &location.key)
            .await
            .map_err(|e| IngestError::payload_fetch(&location, e.to_string()))?;

        let body: EventBody = serde_json::from_slice(&bytes)
            .map_err(|e| IngestError::payload_decode(&location, e.to_string()))?;

        debug!(
            %location,
            bytes = bytes.len(),
            id = %body.document.id_str(),
            "Resolved out-of-line payload"
        );

        event.document = Some(body.document);
        event.resources = body.resources.unwrap_or_default();
        Ok(event)
    }

    /// Remove a consumed payload object.
    ///
    /// Failures are logged and swallowed: the event has already been applied
    /// and a leftover object is harmless.
    pub async fn cleanup(&self, location: &PayloadRef) {
        match self.store.delete(&location.bucket, &location.key).await {
            Ok(()) => debug!(%location, "Removed consumed payload"),
            Err(e) => warn!(%location, error = %e, "Failed to remove consumed payload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryObjectStore;
    use doc_ingester_shared::{Document, Verb};

    fn referencing_event() -> Event {
        Event {
            verb: Verb::Upsert,
            index: "search".to_string(),
            document: None,
            resources: Vec::new(),
            payload_ref: Some(PayloadRef::new("bucket", "events/1.json")),
        }
    }

    #[tokio::test]
    async fn test_inline_event_is_untouched() {
        let store = Arc::new(MemoryObjectStore::new());
        let resolver = PayloadResolver::new(store.clone());
        let doc = Document {
            id: Some("a".to_string()),
            ..Default::default()
        };

        let event = resolver
            .resolve(Event::new(Verb::Upsert, "search", doc))
            .await
            .unwrap();

        assert_eq!(event.document_id(), "a");
        assert_eq!(store.gets(), 0);
    }

    #[tokio::test]
    async fn test_resolves_document_and_resources() {
        let store = Arc::new(MemoryObjectStore::new());
        store
            .put(
                "bucket",
                "events/1.json",
                r#"{"document": {"id": "p", "site": "datahub"}, "resources": [{"title": "r1"}]}"#,
            )
            .await;
        let resolver = PayloadResolver::new(store.clone());

        let event = resolver.resolve(referencing_event()).await.unwrap();

        assert_eq!(event.document_id(), "p");
        assert_eq!(event.resources.len(), 1);
        assert_eq!(
            event.payload_ref,
            Some(PayloadRef::new("bucket", "events/1.json"))
        );
    }

    #[tokio::test]
    async fn test_missing_object_is_fetch_error() {
        let store = Arc::new(MemoryObjectStore::new());
        let resolver = PayloadResolver::new(store);

        let err = resolver.resolve(referencing_event()).await.unwrap_err();

        assert!(matches!(err, IngestError::PayloadFetch { .. }));
        assert!(err.to_string().contains("bucket/events/1.json"));
    }

    #[tokio::test]
    async fn test_malformed_object_is_decode_error() {
        let store = Arc::new(MemoryObjectStore::new());
        store.put("bucket", "events/1.json", "{not json").await;
        let resolver = PayloadResolver::new(store);

        let err = resolver.resolve(referencing_event()).await.unwrap_err();

        assert!(matches!(err, IngestError::PayloadDecode { .. }));
    }

    #[tokio::test]
    async fn test_cleanup_swallows_errors() {
        let store = Arc::new(MemoryObjectStore::new().failing_delete());
        let resolver = PayloadResolver::new(store.clone());
        let location = PayloadRef::new("bucket", "events/1.json");

        resolver.cleanup(&location).await;

        assert_eq!(store.deletes().await, vec![location]);
    }
}
