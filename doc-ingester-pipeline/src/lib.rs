//! # Document Ingester Pipeline
//!
//! This crate applies document-change events to a search index.
//!
//! ## Architecture
//!
//! Each event flows through:
//!
//! 1. **Resolver**: Fetches out-of-line bodies from object storage
//! 2. **Processor**: Dispatches on the verb and runs the stages below
//! 3. **Extractor**: Turns raw file bytes into text
//! 4. **Normalizer**: Derives the truncated display field
//! 5. **Validator**: Checks the document against the configured rules
//! 6. **Lifecycle**: Replaces or removes a composite document's resources
//!
//! The **Handler** runs batches of raw queue messages through the processor,
//! and the **Orchestrator** feeds it from a line-oriented **Consumer**.

pub mod consumer;
pub mod errors;
pub mod extractor;
pub mod handler;
pub mod lifecycle;
pub mod normalizer;
pub mod orchestrator;
pub mod processor;
pub mod resolver;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use consumer::{LineConsumer, LineConsumerConfig, StreamMessage};
pub use errors::{ConsumerError, ErrorKind, IngestError};
pub use handler::{BatchReport, MessageHandler, MessageOutcome};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunStats};
pub use processor::{EventProcessor, ProcessSummary, ProcessorConfig};
pub use validator::RuleSet;
