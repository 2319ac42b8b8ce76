//! Consumer module for the document ingester pipeline.
//!
//! Reads newline-delimited event JSON and forwards it in batches.

mod line_consumer;
mod messages;

pub use line_consumer::{LineConsumer, LineConsumerConfig};
pub use messages::StreamMessage;
