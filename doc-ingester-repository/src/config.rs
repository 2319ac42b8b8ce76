//! Configuration types for the repository adapters.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the OpenSearch index gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Upper bound for a single index request, including the response body.
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    pub fn with_timeout(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

/// Configuration for the directory-backed object store.
///
/// Used for local runs; production payloads live in S3, see [`S3Config`].
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    /// Directory whose subdirectories act as buckets.
    pub root: PathBuf,
    /// Upper bound for a single get or delete.
    pub timeout: Duration,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./object-store"),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Static AWS credentials used to sign S3 requests.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Present for temporary credentials.
    pub session_token: Option<String>,
}

impl fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration for the S3 object store.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub region: String,
    /// Endpoint of an S3-compatible service (MinIO, LocalStack). When set,
    /// requests use path-style addressing against it.
    pub endpoint: Option<String>,
    pub credentials: S3Credentials,
    /// Upper bound for a single get or delete.
    pub timeout: Duration,
}
