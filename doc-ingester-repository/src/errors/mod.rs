//! Error types for the ingester collaborators.

mod engine_error;
mod index_write_error;
mod object_store_error;

pub use engine_error::EngineError;
pub use index_write_error::IndexWriteError;
pub use object_store_error::ObjectStoreError;
