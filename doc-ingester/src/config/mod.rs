//! Configuration for the document ingester.
//!
//! Every setting comes from an environment variable with a default; a `.env`
//! file is honoured by the binary.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::logging::LogFormat;
use crate::IngesterError;
use doc_ingester_pipeline::extractor::ExtractorConfig;
use doc_ingester_pipeline::{LineConsumerConfig, ProcessorConfig, RuleSet};
use doc_ingester_repository::{GatewayConfig, ObjectStoreConfig, S3Config, S3Credentials};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default root directory of the object store.
const DEFAULT_OBJECT_STORE_ROOT: &str = "./object-store";

const DEFAULT_INDEX_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_OBJECT_STORE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_EXTRACT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_BATCH_SIZE: usize = 100;

/// Where out-of-line payloads are read from and deleted.
#[derive(Debug, Clone)]
pub enum ObjectStoreSettings {
    /// Directory tree, one subdirectory per bucket.
    Local(ObjectStoreConfig),
    /// Amazon S3 or an S3-compatible endpoint.
    S3(S3Config),
}

/// Complete ingester configuration.
#[derive(Debug, Clone)]
pub struct IngesterConfig {
    pub opensearch_url: String,
    pub gateway: GatewayConfig,
    pub object_store: ObjectStoreSettings,
    pub processor: ProcessorConfig,
    pub validation_rules: RuleSet,
    /// Indexes created with document mappings on startup when missing.
    pub bootstrap_indexes: Vec<String>,
    pub consumer: LineConsumerConfig,
    pub log_format: LogFormat,
}

impl IngesterConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_TIMEOUT_MS`: Per-request index timeout (default: 30000)
    /// - `OBJECT_STORE`: `local` or `s3` (default: local)
    /// - `OBJECT_STORE_ROOT`: Local object store directory (default: ./object-store)
    /// - `AWS_REGION`: S3 region, required for `s3`
    /// - `S3_ENDPOINT`: S3-compatible endpoint, path-style addressing when set
    /// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: required for `s3`
    /// - `AWS_SESSION_TOKEN`: Optional session token
    /// - `OBJECT_STORE_TIMEOUT_MS`: Per-call object store timeout (default: 10000)
    /// - `EXTRACT_TIMEOUT_MS`: Extraction timeout (default: 60000)
    /// - `EXTRACT_CHAR_LIMIT`: Extraction character limit (default: unbounded)
    /// - `TRUNCATE_LENGTH`: Characters kept in `content_truncated` (default: 200)
    /// - `VALIDATION_RULES_PATH`: JSON file with extra validation rules
    /// - `BOOTSTRAP_INDEXES`: Comma-separated indexes to create on startup
    /// - `BATCH_SIZE`: Maximum messages per batch (default: 100)
    /// - `LOG_FORMAT`: `plain` or `json` (default: plain)
    pub fn from_env() -> Result<Self, IngesterError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IngesterError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let opensearch_url =
            var("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());

        let gateway = GatewayConfig::with_timeout(millis(
            var("INDEX_TIMEOUT_MS"),
            "INDEX_TIMEOUT_MS",
            DEFAULT_INDEX_TIMEOUT_MS,
        )?);

        let object_store_timeout = millis(
            var("OBJECT_STORE_TIMEOUT_MS"),
            "OBJECT_STORE_TIMEOUT_MS",
            DEFAULT_OBJECT_STORE_TIMEOUT_MS,
        )?;
        let object_store = match var("OBJECT_STORE").as_deref().map(str::trim) {
            None | Some("local") => ObjectStoreSettings::Local(ObjectStoreConfig {
                root: PathBuf::from(
                    var("OBJECT_STORE_ROOT")
                        .unwrap_or_else(|| DEFAULT_OBJECT_STORE_ROOT.to_string()),
                ),
                timeout: object_store_timeout,
            }),
            Some("s3") => ObjectStoreSettings::S3(S3Config {
                region: required(var("AWS_REGION"), "AWS_REGION")?,
                endpoint: var("S3_ENDPOINT"),
                credentials: S3Credentials {
                    access_key_id: required(var("AWS_ACCESS_KEY_ID"), "AWS_ACCESS_KEY_ID")?,
                    secret_access_key: required(
                        var("AWS_SECRET_ACCESS_KEY"),
                        "AWS_SECRET_ACCESS_KEY",
                    )?,
                    session_token: var("AWS_SESSION_TOKEN"),
                },
                timeout: object_store_timeout,
            }),
            Some(other) => {
                return Err(IngesterError::config(format!(
                    "OBJECT_STORE must be 'local' or 's3', got '{other}'"
                )))
            }
        };

        let mut processor = ProcessorConfig::default();
        processor.extractor = ExtractorConfig {
            char_limit: parse_opt(var("EXTRACT_CHAR_LIMIT"), "EXTRACT_CHAR_LIMIT")?,
            timeout: millis(
                var("EXTRACT_TIMEOUT_MS"),
                "EXTRACT_TIMEOUT_MS",
                DEFAULT_EXTRACT_TIMEOUT_MS,
            )?,
        };
        if let Some(length) = parse_opt(var("TRUNCATE_LENGTH"), "TRUNCATE_LENGTH")? {
            processor.truncate_length = length;
        }

        let validation_rules = match var("VALIDATION_RULES_PATH") {
            Some(path) => RuleSet::default().extend(load_rules(&path)?),
            None => RuleSet::default(),
        };

        let bootstrap_indexes = var("BOOTSTRAP_INDEXES")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let consumer = LineConsumerConfig {
            batch_size: parse_opt(var("BATCH_SIZE"), "BATCH_SIZE")?.unwrap_or(DEFAULT_BATCH_SIZE),
            ..LineConsumerConfig::default()
        };

        let log_format = match var("LOG_FORMAT") {
            Some(v) => v.parse::<LogFormat>().map_err(IngesterError::config)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            opensearch_url,
            gateway,
            object_store,
            processor,
            validation_rules,
            bootstrap_indexes,
            consumer,
            log_format,
        })
    }
}

fn parse_opt<T: FromStr>(value: Option<String>, key: &str) -> Result<Option<T>, IngesterError> {
    value
        .map(|v| {
            v.trim().parse().map_err(|_| {
                IngesterError::config(format!("{key} must be a non-negative integer, got '{v}'"))
            })
        })
        .transpose()
}

fn required(value: Option<String>, key: &str) -> Result<String, IngesterError> {
    value.ok_or_else(|| IngesterError::config(format!("{key} must be set")))
}

fn millis(value: Option<String>, key: &str, default: u64) -> Result<Duration, IngesterError> {
    Ok(Duration::from_millis(parse_opt(value, key)?.unwrap_or(default)))
}

fn load_rules(path: &str) -> Result<RuleSet, IngesterError> {
    let json = fs::read_to_string(path)?;
    RuleSet::from_json(&json)
        .map_err(|e| IngesterError::config(format!("Invalid validation rules in {path}: {e}")))
}
