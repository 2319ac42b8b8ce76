//! Recording collaborators shared by the pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::processor::{EventProcessor, ProcessorConfig};
use crate::validator::RuleSet;
use doc_ingester_repository::{
    EngineError, EngineOutput, ExtractedMetadata, Extraction, ExtractionEngine, IndexGateway,
    IndexWriteError, ObjectStore, ObjectStoreError, WriteOutcome,
};
use doc_ingester_shared::{Document, PayloadRef};

/// A write issued against the index, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GatewayCall {
    Upsert {
        index: String,
        id: String,
        document: Document,
    },
    Delete {
        index: String,
        id: String,
    },
    DeleteByParent {
        index: String,
        parent_id: String,
    },
}

/// Index gateway that records every call.
#[derive(Default)]
pub(crate) struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    fail_upsert_at: Option<usize>,
    fail_delete: bool,
    fail_delete_by_parent: bool,
    children: u64,
}

impl RecordingGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reject the upsert at this position (zero-based) among all upserts.
    pub(crate) fn failing_upsert_at(mut self, position: usize) -> Self {
        self.fail_upsert_at = Some(position);
        self
    }

    /// Answer every delete with "not found".
    pub(crate) fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub(crate) fn failing_delete_by_parent(mut self) -> Self {
        self.fail_delete_by_parent = true;
        self
    }

    /// Report this many resources removed by each delete-by-parent.
    pub(crate) fn with_children(mut self, children: u64) -> Self {
        self.children = children;
        self
    }

    pub(crate) async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn upserts(&self) -> Vec<Document> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Upsert { document, .. } => Some(document),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl IndexGateway for RecordingGateway {
    async fn upsert(
        &self,
        index: &str,
        id: &str,
        document: &Document,
    ) -> Result<WriteOutcome, IndexWriteError> {
        let mut calls = self.calls.lock().await;
        let position = calls
            .iter()
            .filter(|c| matches!(c, GatewayCall::Upsert { .. }))
            .count();
        calls.push(GatewayCall::Upsert {
            index: index.to_string(),
            id: id.to_string(),
            document: document.clone(),
        });
        if self.fail_upsert_at == Some(position) {
            return Err(IndexWriteError::rejected(
                "upsert",
                400,
                r#"{"error":"mapper_parsing_exception"}"#,
            ));
        }
        Ok(WriteOutcome::Created)
    }

    async fn delete(&self, index: &str, id: &str) -> Result<(), IndexWriteError> {
        self.calls.lock().await.push(GatewayCall::Delete {
            index: index.to_string(),
            id: id.to_string(),
        });
        if self.fail_delete {
            return Err(IndexWriteError::rejected(
                "delete",
                404,
                r#"{"result":"not_found"}"#,
            ));
        }
        Ok(())
    }

    async fn delete_by_parent_id(
        &self,
        index: &str,
        parent_id: &str,
    ) -> Result<u64, IndexWriteError> {
        self.calls.lock().await.push(GatewayCall::DeleteByParent {
            index: index.to_string(),
            parent_id: parent_id.to_string(),
        });
        if self.fail_delete_by_parent {
            return Err(IndexWriteError::Partial {
                operation: "delete_by_parent_id",
                status: 200,
                total: 2,
                failed: 1,
                body: "{}".to_string(),
            });
        }
        Ok(self.children)
    }
}

/// In-memory object store that records gets and deletes.
#[derive(Default)]
pub(crate) struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    gets: AtomicUsize,
    deletes: Mutex<Vec<PayloadRef>>,
    fail_delete: bool,
}

impl MemoryObjectStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub(crate) async fn put(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    pub(crate) fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) async fn deletes(&self) -> Vec<PayloadRef> {
        self.deletes.lock().await.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| ObjectStoreError::not_found(bucket, key))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        self.deletes.lock().await.push(PayloadRef::new(bucket, key));
        if self.fail_delete {
            return Err(ObjectStoreError::io("access denied"));
        }
        self.objects
            .lock()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

/// Extraction engine returning a fixed result, or echoing UTF-8 input.
#[derive(Default)]
pub(crate) struct StubEngine {
    response: Option<Result<Extraction, EngineError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubEngine {
    pub(crate) fn echo() -> Self {
        Self::default()
    }

    pub(crate) fn returning(response: Result<Extraction, EngineError>) -> Self {
        Self {
            response: Some(response),
            ..Default::default()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionEngine for StubEngine {
    async fn extract(
        &self,
        bytes: &[u8],
        _limit: Option<usize>,
    ) -> Result<Extraction, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            Some(response) => response.clone(),
            None => Ok(Extraction::Complete(EngineOutput {
                text: String::from_utf8_lossy(bytes).into_owned(),
                metadata: ExtractedMetadata::default(),
            })),
        }
    }
}

/// A processor wired to the given doubles with default configuration.
pub(crate) fn processor_with(
    gateway: Arc<RecordingGateway>,
    store: Arc<MemoryObjectStore>,
    engine: Arc<StubEngine>,
) -> EventProcessor {
    EventProcessor::new(
        gateway,
        store,
        engine,
        ProcessorConfig::default(),
        RuleSet::default(),
    )
}
