//! OpenSearch implementation of the index gateway.
//!
//! This module provides a concrete implementation of `IndexGateway`
//! using OpenSearch as the backend.

mod client;
mod index_config;
mod queries;

pub use client::OpenSearchGateway;
pub use index_config::document_index_settings;
