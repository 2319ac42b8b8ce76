//! Dependency initialization and wiring for the document ingester.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tracing::info;

use crate::config::{IngesterConfig, ObjectStoreSettings};
use crate::IngesterError;
use doc_ingester_pipeline::{EventProcessor, LineConsumer, MessageHandler, Orchestrator};
use doc_ingester_repository::{
    BuiltinExtractionEngine, LocalObjectStore, ObjectStore, OpenSearchGateway, S3ObjectStore,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The processor shared by every handled message.
    pub processor: Arc<EventProcessor>,
    config: IngesterConfig,
}

impl Dependencies {
    /// Initialize all dependencies from the given configuration.
    ///
    /// Creates the bootstrap indexes before returning, so a missing or
    /// unreachable index endpoint fails startup.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IngesterError)` - If initialization fails
    pub async fn new(config: IngesterConfig) -> Result<Self, IngesterError> {
        info!(
            opensearch_url = %config.opensearch_url,
            bootstrap_indexes = ?config.bootstrap_indexes,
            "Initializing dependencies"
        );

        let gateway = OpenSearchGateway::new(&config.opensearch_url, config.gateway.clone())
            .map_err(|e| {
                IngesterError::config(format!("Failed to create OpenSearch client: {e}"))
            })?;

        for index in &config.bootstrap_indexes {
            gateway.ensure_index(index).await?;
        }

        let store = object_store(&config.object_store)?;
        let engine = BuiltinExtractionEngine::new();

        let processor = EventProcessor::new(
            Arc::new(gateway),
            store,
            Arc::new(engine),
            config.processor.clone(),
            config.validation_rules.clone(),
        );

        Ok(Self {
            processor: Arc::new(processor),
            config,
        })
    }

    /// Build an orchestrator reading events from `reader`.
    pub fn orchestrator<R>(&self, reader: R) -> Orchestrator<R>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let consumer = LineConsumer::with_config(reader, self.config.consumer.clone());
        Orchestrator::new(consumer, MessageHandler::new(self.processor.clone()))
    }
}

fn object_store(settings: &ObjectStoreSettings) -> Result<Arc<dyn ObjectStore>, IngesterError> {
    match settings {
        ObjectStoreSettings::Local(local) => {
            info!(root = %local.root.display(), "Using local object store");
            Ok(Arc::new(LocalObjectStore::new(local.clone())))
        }
        ObjectStoreSettings::S3(s3) => {
            info!(region = %s3.region, endpoint = ?s3.endpoint, "Using S3 object store");
            let store = S3ObjectStore::new(s3.clone())
                .map_err(|e| IngesterError::config(format!("Failed to create S3 client: {e}")))?;
            Ok(Arc::new(store))
        }
    }
}
