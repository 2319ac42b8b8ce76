//! Handler module for the document ingester pipeline.
//!
//! Runs batches of raw queue message bodies through the [`EventProcessor`]
//! and reports a per-message outcome, so a consumer can acknowledge the
//! messages that succeeded and redeliver the rest.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::IngestError;
use crate::processor::{EventProcessor, ProcessSummary};
use doc_ingester_shared::EventMessage;

/// Result of handling one message body.
#[derive(Debug)]
pub enum MessageOutcome {
    Completed(ProcessSummary),
    Failed(IngestError),
    /// The body is not a JSON event message.
    Malformed(String),
}

impl MessageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MessageOutcome::Completed(_))
    }
}

/// Outcomes of a batch, in message order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Positions of the messages that did not complete.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_success())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Decodes raw message bodies and hands them to the processor.
#[derive(Clone)]
pub struct MessageHandler {
    processor: Arc<EventProcessor>,
}

impl MessageHandler {
    pub fn new(processor: Arc<EventProcessor>) -> Self {
        Self { processor }
    }

    /// Handle a single raw message body.
    pub async fn handle_message(&self, body: &str) -> MessageOutcome {
        let message: EventMessage = match serde_json::from_str(body) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Skipping malformed message");
                return MessageOutcome::Malformed(e.to_string());
            }
        };

        match self.processor.handle_message(message).await {
            Ok(summary) => MessageOutcome::Completed(summary),
            Err(e) => MessageOutcome::Failed(e),
        }
    }

    /// Handle a batch of raw message bodies, one after the other.
    ///
    /// A failed message does not stop the rest of the batch.
    #[instrument(skip(self, bodies), fields(batch_size = bodies.len()))]
    pub async fn handle_batch(&self, bodies: Vec<String>) -> BatchReport {
        let mut report = BatchReport {
            outcomes: Vec::with_capacity(bodies.len()),
        };

        for body in &bodies {
            report.outcomes.push(self.handle_message(body).await);
        }

        info!(
            total = report.total(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Handled message batch"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::testing::{processor_with, MemoryObjectStore, RecordingGateway, StubEngine};

    fn handler(gateway: Arc<RecordingGateway>) -> MessageHandler {
        let processor = processor_with(
            gateway,
            Arc::new(MemoryObjectStore::new()),
            Arc::new(StubEngine::echo()),
        );
        MessageHandler::new(Arc::new(processor))
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let gateway = Arc::new(RecordingGateway::new());
        let handler = handler(gateway.clone());
        let bodies = vec![
            r#"{"index": "search", "verb": "upsert", "document": {"id": "a", "site": "web"}}"#
                .to_string(),
            "not json".to_string(),
            r#"{"index": "search", "verb": "spike", "document": {"id": "b"}}"#.to_string(),
            r#"{"index": "search", "verb": "delete", "document": {"id": "c"}}"#.to_string(),
        ];

        let report = handler.handle_batch(bodies).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed_indices(), vec![1, 2]);
        assert!(matches!(report.outcomes[1], MessageOutcome::Malformed(_)));
        match &report.outcomes[2] {
            MessageOutcome::Failed(e) => assert_eq!(e.kind(), ErrorKind::UnknownVerb),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(gateway.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_message_missing_required_keys_is_malformed() {
        let handler = handler(Arc::new(RecordingGateway::new()));

        let outcome = handler.handle_message(r#"{"document": {"id": "a"}}"#).await;

        assert!(matches!(outcome, MessageOutcome::Malformed(_)));
    }

    #[tokio::test]
    async fn test_completed_outcome_carries_summary() {
        let handler = handler(Arc::new(RecordingGateway::new()));

        let outcome = handler
            .handle_message(
                r#"{"index": "search", "verb": "upsert",
                    "document": {"id": "p", "site": "datahub"},
                    "resources": [{"title": "one"}, {"title": "two"}]}"#,
            )
            .await;

        match outcome {
            MessageOutcome::Completed(summary) => {
                assert_eq!(summary.document_id, "p");
                assert_eq!(summary.resource_ids.len(), 2);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
