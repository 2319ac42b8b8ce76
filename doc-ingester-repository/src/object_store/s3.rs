//! Amazon S3 object store.
//!
//! Talks to the S3 REST API directly and signs every request with AWS
//! Signature Version 4 (`hmac` + `sha2`). Buckets are addressed
//! virtual-hosted style on AWS and path style against a custom endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Method, StatusCode};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::S3Config;
use crate::errors::ObjectStoreError;
use crate::interfaces::ObjectStore;

type HmacSha256 = Hmac<Sha256>;

/// Object store backed by S3 or an S3-compatible service.
pub struct S3ObjectStore {
    client: reqwest::Client,
    config: S3Config,
}

/// Where a request for one object goes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObjectUrl {
    /// Value of the `host` header, port included when not the default.
    host: String,
    /// Encoded absolute path, used verbatim as the canonical URI.
    path: String,
    url: String,
}

/// A request ready to send: target URL plus the headers to attach.
#[derive(Debug, Clone)]
struct SignedRequest {
    url: String,
    headers: Vec<(&'static str, String)>,
}

impl S3ObjectStore {
    pub fn new(config: S3Config) -> Result<Self, ObjectStoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ObjectStoreError::io(format!("Failed to build S3 client: {e}")))?;
        Ok(Self { client, config })
    }

    fn object_url(&self, bucket: &str, key: &str) -> ObjectUrl {
        let encoded_key = key.split('/').map(uri_encode).collect::<Vec<_>>().join("/");

        match &self.config.endpoint {
            Some(endpoint) => {
                let base = endpoint.trim_end_matches('/');
                let host = base
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .to_string();
                let path = format!("/{}/{}", uri_encode(bucket), encoded_key);
                ObjectUrl {
                    host,
                    url: format!("{base}{path}"),
                    path,
                }
            }
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", bucket, self.config.region);
                let path = format!("/{encoded_key}");
                ObjectUrl {
                    url: format!("https://{host}{path}"),
                    host,
                    path,
                }
            }
        }
    }

    fn sign(
        &self,
        method: &Method,
        bucket: &str,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedRequest, ObjectStoreError> {
        let credentials = &self.config.credentials;
        let target = self.object_url(bucket, key);
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex_sha256(b"");

        let mut headers = vec![
            ("host", target.host.clone()),
            ("x-amz-content-sha256", payload_hash.clone()),
            ("x-amz-date", amz_date.clone()),
        ];
        if let Some(token) = &credentials.session_token {
            headers.push(("x-amz-security-token", token.clone()));
        }
        headers.sort_by(|a, b| a.0.cmp(b.0));

        let signed_headers = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");
        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();

        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method.as_str(),
            target.path,
            canonical_headers,
            signed_headers,
            payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(
            &credentials.secret_access_key,
            &date_stamp,
            &self.config.region,
            "s3",
        )?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            credentials.access_key_id, credential_scope, signed_headers, signature
        );

        // reqwest derives `host` from the URL.
        let mut request_headers: Vec<_> = headers
            .into_iter()
            .filter(|(name, _)| *name != "host")
            .collect();
        request_headers.push(("authorization", authorization));

        Ok(SignedRequest {
            url: target.url,
            headers: request_headers,
        })
    }

    async fn send(
        &self,
        method: Method,
        bucket: &str,
        key: &str,
    ) -> Result<reqwest::Response, ObjectStoreError> {
        let signed = self.sign(&method, bucket, key, Utc::now())?;

        let mut request = self.client.request(method.clone(), &signed.url);
        for (name, value) in &signed.headers {
            request = request.header(*name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ObjectStoreError::Timeout(self.config.timeout)
            } else {
                ObjectStoreError::io(format!("S3 {method} s3://{bucket}/{key} failed: {e}"))
            }
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(ObjectStoreError::not_found(bucket, key)),
            status => Err(ObjectStoreError::io(format!(
                "S3 {method} s3://{bucket}/{key} failed (HTTP {status})"
            ))),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let response = self.send(Method::GET, bucket, key).await?;
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ObjectStoreError::Timeout(self.config.timeout)
            } else {
                ObjectStoreError::io(format!("Failed to read s3://{bucket}/{key}: {e}"))
            }
        })?;

        debug!(bucket = %bucket, key = %key, bytes = bytes.len(), "Read object");
        Ok(bytes.to_vec())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        self.send(Method::DELETE, bucket, key).await?;
        debug!(bucket = %bucket, key = %key, "Deleted object");
        Ok(())
    }
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ObjectStoreError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ObjectStoreError::io(format!("Failed to sign S3 request: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derive the SigV4 signing key:
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, dateStamp)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
fn derive_signing_key(
    secret_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, ObjectStoreError> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// RFC 3986 encoding; only `A-Z a-z 0-9 - _ . ~` pass through.
fn uri_encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
