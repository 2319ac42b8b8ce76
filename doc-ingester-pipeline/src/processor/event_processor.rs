//! Event processor implementation.
//!
//! Drives a single event through `Received -> Resolved -> Upsert | Delete ->
//! Completed`, or `Failed` from any state. Stages run strictly one after the
//! other and the first failure aborts the rest; nothing already written is
//! rolled back.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::errors::IngestError;
use crate::extractor::{ContentExtractor, ExtractorConfig};
use crate::lifecycle::ResourceLifecycleManager;
use crate::normalizer::{DocumentNormalizer, DEFAULT_TRUNCATE_LENGTH, TRUNCATION_MARKER};
use crate::resolver::PayloadResolver;
use crate::validator::{DocumentValidator, FieldViolation, RuleSet};
use doc_ingester_repository::{ExtractionEngine, IndexGateway, ObjectStore};
use doc_ingester_shared::{Document, Event, EventMessage, Verb, COMPOSITE_SITE};

/// Configuration for the event processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Characters kept in `content_truncated`.
    pub truncate_length: usize,
    /// Appended to `content_truncated` when content was cut.
    pub truncation_marker: String,
    /// Site value marking a document as composite.
    pub composite_site: String,
    pub extractor: ExtractorConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            truncate_length: DEFAULT_TRUNCATE_LENGTH,
            truncation_marker: TRUNCATION_MARKER.to_string(),
            composite_site: COMPOSITE_SITE.to_string(),
            extractor: ExtractorConfig::default(),
        }
    }
}

/// Processing states of a single event, as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Received,
    Resolved,
    Upsert,
    Delete,
    Completed,
    Failed,
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventState::Received => "received",
            EventState::Resolved => "resolved",
            EventState::Upsert => "upsert",
            EventState::Delete => "delete",
            EventState::Completed => "completed",
            EventState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a successfully processed event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub verb: Verb,
    pub document_id: String,
    /// Resources removed by the cascade delete; always 0 for non-composites.
    pub resources_deleted: u64,
    /// Ids generated for the resources written, in input order.
    pub resource_ids: Vec<String>,
    /// The extraction engine stopped at its character limit.
    pub extraction_truncated: bool,
}

impl ProcessSummary {
    fn new(verb: Verb, document_id: impl Into<String>) -> Self {
        Self {
            verb,
            document_id: document_id.into(),
            resources_deleted: 0,
            resource_ids: Vec::new(),
            extraction_truncated: false,
        }
    }
}

/// Applies document-change events to the search index.
///
/// Every collaborator is injected at construction time; the processor holds
/// no per-event state, so one instance can serve concurrent events.
pub struct EventProcessor {
    resolver: PayloadResolver,
    extractor: ContentExtractor,
    normalizer: DocumentNormalizer,
    validator: DocumentValidator,
    lifecycle: ResourceLifecycleManager,
    gateway: Arc<dyn IndexGateway>,
}

impl EventProcessor {
    /// Create a new event processor.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Search index the events are applied to
    /// * `store` - Object store holding out-of-line event bodies
    /// * `engine` - Text extraction engine for `file_base64` content
    /// * `config` - Truncation, composite and extraction settings
    /// * `rules` - Validation rules for upserted documents
    pub fn new(
        gateway: Arc<dyn IndexGateway>,
        store: Arc<dyn ObjectStore>,
        engine: Arc<dyn ExtractionEngine>,
        config: ProcessorConfig,
        rules: RuleSet,
    ) -> Self {
        let normalizer = DocumentNormalizer::new(config.truncate_length, config.truncation_marker);

        Self {
            resolver: PayloadResolver::new(store),
            extractor: ContentExtractor::with_config(engine, config.extractor),
            validator: DocumentValidator::new(rules, config.composite_site.clone()),
            lifecycle: ResourceLifecycleManager::new(
                gateway.clone(),
                normalizer.clone(),
                config.composite_site,
            ),
            normalizer,
            gateway,
        }
    }

    /// Process a raw wire message.
    ///
    /// The verb is checked before anything else, so a message with an
    /// unrecognised verb fails without any object store or index call.
    pub async fn handle_message(
        &self,
        message: EventMessage,
    ) -> Result<ProcessSummary, IngestError> {
        let event = Event::try_from(message).map_err(|e| {
            error!(
                state = %EventState::Failed,
                kind = "unknown_verb",
                error = %e,
                "Rejected event"
            );
            IngestError::from(e)
        })?;
        self.handle(event).await
    }

    /// Process a single event.
    ///
    /// The out-of-line payload, if any, is removed only after every stage
    /// succeeded.
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessSummary)` - If all stages for the verb completed
    /// * `Err(IngestError)` - The first stage failure
    #[instrument(skip(self, event), fields(index = %event.index, verb = %event.verb))]
    pub async fn handle(&self, event: Event) -> Result<ProcessSummary, IngestError> {
        debug!(
            state = %EventState::Received,
            id = %event.document_id(),
            payload_ref = event.payload_ref.is_some(),
            "Received event"
        );

        match self.run(event).await {
            Ok(summary) => {
                info!(
                    state = %EventState::Completed,
                    id = %summary.document_id,
                    resources_deleted = summary.resources_deleted,
                    resources_written = summary.resource_ids.len(),
                    "Processed event"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(
                    state = %EventState::Failed,
                    kind = %e.kind(),
                    error = %e,
                    "Failed to process event"
                );
                Err(e)
            }
        }
    }

    async fn run(&self, event: Event) -> Result<ProcessSummary, IngestError> {
        let event = self.resolver.resolve(event).await?;
        debug!(
            state = %EventState::Resolved,
            id = %event.document_id(),
            site = %event.document.as_ref().map(Document::site_str).unwrap_or_default(),
            "Resolved event"
        );

        let payload_ref = event.payload_ref.clone();
        let summary = match event.verb {
            Verb::Upsert => self.upsert(event).await?,
            Verb::Delete => self.delete(event).await?,
        };

        if let Some(location) = payload_ref {
            self.resolver.cleanup(&location).await;
        }
        Ok(summary)
    }

    async fn upsert(&self, event: Event) -> Result<ProcessSummary, IngestError> {
        let Event {
            index,
            document,
            resources,
            ..
        } = event;
        let mut document = require_target(&index, document)?;
        debug!(state = %EventState::Upsert, id = %document.id_str(), "Upserting document");

        let extraction_truncated = self.extractor.apply(&mut document).await?;
        self.normalizer.apply(&mut document);

        let violations = self.validator.validate(&document);
        if !violations.is_empty() {
            return Err(IngestError::Validation(violations));
        }

        let id = document.id_str().to_string();
        let mut summary = ProcessSummary::new(Verb::Upsert, id.as_str());
        summary.extraction_truncated = extraction_truncated;

        let composite = self.lifecycle.applies_to(&document);
        if composite {
            summary.resources_deleted = self
                .lifecycle
                .delete_existing_resources(&index, &id)
                .await?;
        }

        let outcome = self.gateway.upsert(&index, &id, &document).await?;
        debug!(?outcome, "Wrote document");

        if composite && !resources.is_empty() {
            summary.resource_ids = self
                .lifecycle
                .upsert_resources(&index, &document, resources)
                .await?;
        } else if !resources.is_empty() {
            debug!(
                count = resources.len(),
                "Ignoring resources of non-composite document"
            );
        }

        Ok(summary)
    }

    async fn delete(&self, event: Event) -> Result<ProcessSummary, IngestError> {
        let document = require_target(&event.index, event.document)?;
        debug!(state = %EventState::Delete, id = %document.id_str(), "Deleting document");

        let violations = self.validator.validate_for_delete(&document);
        if !violations.is_empty() {
            return Err(IngestError::Validation(violations));
        }

        let id = document.id_str();
        let mut summary = ProcessSummary::new(Verb::Delete, id);

        if self.lifecycle.applies_to(&document) {
            summary.resources_deleted = self
                .lifecycle
                .delete_existing_resources(&event.index, id)
                .await?;
        }

        self.gateway.delete(&event.index, id).await?;
        Ok(summary)
    }
}

/// Check that the event names an index and carries a document.
fn require_target(index: &str, document: Option<Document>) -> Result<Document, IngestError> {
    let mut violations = Vec::new();
    if index.trim().is_empty() {
        violations.push(FieldViolation::new("index", "is required"));
    }
    if document.is_none() {
        violations.push(FieldViolation::new("document", "is required"));
    }

    match document {
        Some(document) if violations.is_empty() => Ok(document),
        _ => Err(IngestError::Validation(violations)),
    }
}
