//! Processor module for the document ingester pipeline.
//!
//! Applies one event to the search index.

mod event_processor;

pub use event_processor::{EventProcessor, EventState, ProcessSummary, ProcessorConfig};
