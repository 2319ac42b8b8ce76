//! # Document Ingester Repository
//!
//! This crate provides the interfaces the ingester consumes from the outside
//! world (search index, object store, text extraction engine) together with
//! thin production adapters: OpenSearch, S3 and directory-backed object
//! stores, and a built-in extraction engine.

pub mod config;
pub mod errors;
pub mod extraction;
pub mod interfaces;
pub mod object_store;
pub mod opensearch;

pub use config::{GatewayConfig, ObjectStoreConfig, S3Config, S3Credentials};
pub use errors::{EngineError, IndexWriteError, ObjectStoreError};
pub use extraction::BuiltinExtractionEngine;
pub use interfaces::{
    EngineOutput, ExtractedMetadata, Extraction, ExtractionEngine, IndexGateway, ObjectStore,
    WriteOutcome,
};
pub use object_store::{LocalObjectStore, S3ObjectStore};
pub use opensearch::OpenSearchGateway;
