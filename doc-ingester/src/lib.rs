//! # Document Ingester
//!
//! Main library for the document ingester.
//!
//! This crate provides the configuration, dependency wiring and logging
//! setup for running the ingester pipeline.

pub mod config;
pub mod logging;

pub use config::{Dependencies, IngesterConfig, ObjectStoreSettings};

use thiserror::Error;

/// Errors that can occur during ingester initialization.
#[derive(Error, Debug)]
pub enum IngesterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Index error.
    #[error("Index error: {0}")]
    IndexError(#[from] doc_ingester_repository::IndexWriteError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IngesterError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
