//! Interface definitions for the ingester's external collaborators.
//!
//! These traits allow dependency injection of the search index, object store
//! and extraction engine, so the pipeline can be exercised against mocks.

mod extraction_engine;
mod index_gateway;
mod object_store;

pub use extraction_engine::{EngineOutput, ExtractedMetadata, Extraction, ExtractionEngine};
pub use index_gateway::{IndexGateway, WriteOutcome};
pub use object_store::ObjectStore;
