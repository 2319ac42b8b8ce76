//! Directory-backed object store.
//!
//! Buckets are subdirectories of a root directory and keys are relative paths
//! within them. Used for local runs and integration environments where the
//! producer drops oversized bodies on a shared volume.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ObjectStoreConfig;
use crate::errors::ObjectStoreError;
use crate::interfaces::ObjectStore;

/// Object store rooted at a local directory.
pub struct LocalObjectStore {
    root: PathBuf,
    timeout: Duration,
}

impl LocalObjectStore {
    pub fn new(config: ObjectStoreConfig) -> Self {
        Self {
            root: config.root,
            timeout: config.timeout,
        }
    }

    /// Resolve `bucket`/`key` to a path under the root, refusing anything
    /// that would escape it.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(bucket).join(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || key.is_empty() || escapes {
            return Err(ObjectStoreError::io(format!(
                "invalid object location {bucket}/{key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let path = self.object_path(bucket, key)?;

        let bytes = tokio::time::timeout(self.timeout, tokio::fs::read(&path))
            .await
            .map_err(|_| ObjectStoreError::Timeout(self.timeout))?
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ObjectStoreError::not_found(bucket, key),
                _ => ObjectStoreError::io(e.to_string()),
            })?;

        debug!(bucket = %bucket, key = %key, bytes = bytes.len(), "Read object");
        Ok(bytes)
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(bucket, key)?;

        tokio::time::timeout(self.timeout, tokio::fs::remove_file(&path))
            .await
            .map_err(|_| ObjectStoreError::Timeout(self.timeout))?
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ObjectStoreError::not_found(bucket, key),
                _ => ObjectStoreError::io(e.to_string()),
            })?;

        debug!(bucket = %bucket, key = %key, "Deleted object");
        Ok(())
    }
}
