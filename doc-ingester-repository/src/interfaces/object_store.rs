//! Object store trait definition.

use async_trait::async_trait;

use crate::errors::ObjectStoreError;

/// Storage holding out-of-line event bodies.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the bytes stored at `bucket`/`key`.
    ///
    /// Returns `ObjectStoreError::NotFound` when nothing is stored there.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Remove the object stored at `bucket`/`key`.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError>;
}
