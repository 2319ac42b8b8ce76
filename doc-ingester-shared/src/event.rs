//! Event types.
//!
//! [`EventMessage`] is the JSON object consumed from the queue. It is turned
//! into an [`Event`] once its verb is known to be one the ingester handles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;

/// What an event asks the ingester to do with its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Add or replace the document.
    Upsert,
    /// Remove the document.
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Upsert => "upsert",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verb value the ingester does not recognise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected verb to be 'upsert' or 'delete' but got '{0}'")]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upsert" => Ok(Verb::Upsert),
            "delete" => Ok(Verb::Delete),
            other => Err(UnknownVerb(other.to_string())),
        }
    }
}

/// Location of an out-of-line event body in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadRef {
    pub bucket: String,
    pub key: String,
}

impl PayloadRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for PayloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// A queue message as it arrives on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMessage {
    pub index: String,
    pub verb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Document>>,
    #[serde(
        rename = "s3Bucket",
        alias = "S3BucketName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_bucket: Option<String>,
    #[serde(
        rename = "s3Key",
        alias = "S3Key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_key: Option<String>,
}

impl EventMessage {
    /// The out-of-line payload reference. Present only when both the bucket
    /// and the key are set.
    pub fn payload_ref(&self) -> Option<PayloadRef> {
        match (&self.s3_bucket, &self.s3_key) {
            (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => {
                Some(PayloadRef::new(bucket.as_str(), key.as_str()))
            }
            _ => None,
        }
    }
}

/// The body stored out-of-line in object storage.
///
/// Any other keys in the stored object (an older producer writes the whole
/// message) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBody {
    pub document: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Document>>,
}

/// One unit of work with a recognised verb.
#[derive(Debug, Clone)]
pub struct Event {
    pub verb: Verb,
    pub index: String,
    pub document: Option<Document>,
    /// Child documents, only meaningful for composite upserts.
    pub resources: Vec<Document>,
    pub payload_ref: Option<PayloadRef>,
}

impl Event {
    pub fn new(verb: Verb, index: impl Into<String>, document: Document) -> Self {
        Self {
            verb,
            index: index.into(),
            document: Some(document),
            resources: Vec::new(),
            payload_ref: None,
        }
    }

    pub fn with_resources(mut self, resources: Vec<Document>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_payload_ref(mut self, payload_ref: PayloadRef) -> Self {
        self.payload_ref = Some(payload_ref);
        self
    }

    /// The document id, or an empty string when there is no document yet.
    pub fn document_id(&self) -> &str {
        self.document.as_ref().map(Document::id_str).unwrap_or_default()
    }
}

impl TryFrom<EventMessage> for Event {
    type Error = UnknownVerb;

    fn try_from(message: EventMessage) -> Result<Self, Self::Error> {
        let verb = message.verb.parse::<Verb>()?;
        let payload_ref = message.payload_ref();

        Ok(Self {
            verb,
            index: message.index,
            document: message.document,
            resources: message.resources.unwrap_or_default(),
            payload_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parsing() {
        assert_eq!("upsert".parse::<Verb>(), Ok(Verb::Upsert));
        assert_eq!("delete".parse::<Verb>(), Ok(Verb::Delete));
        assert_eq!(
            "spike".parse::<Verb>(),
            Err(UnknownVerb("spike".to_string()))
        );
        assert!("UPSERT".parse::<Verb>().is_err());
    }

    #[test]
    fn test_inline_message_into_event() {
        let json = r#"{
            "index": "search",
            "verb": "upsert",
            "document": {"id": "a", "site": "datahub"},
            "resources": [{"title": "child"}]
        }"#;

        let message: EventMessage = serde_json::from_str(json).unwrap();
        let event = Event::try_from(message).unwrap();

        assert_eq!(event.verb, Verb::Upsert);
        assert_eq!(event.index, "search");
        assert_eq!(event.document_id(), "a");
        assert_eq!(event.resources.len(), 1);
        assert!(event.payload_ref.is_none());
    }

    #[test]
    fn test_payload_ref_requires_bucket_and_key() {
        let json = r#"{"index": "search", "verb": "upsert", "s3Bucket": "b", "s3Key": "k"}"#;
        let message: EventMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.payload_ref(), Some(PayloadRef::new("b", "k")));

        let json = r#"{"index": "search", "verb": "upsert", "s3Bucket": "b"}"#;
        let message: EventMessage = serde_json::from_str(json).unwrap();
        assert!(message.payload_ref().is_none());
    }

    #[test]
    fn test_legacy_payload_ref_aliases() {
        let json = r#"{"index": "i", "verb": "delete", "S3BucketName": "b", "S3Key": "k"}"#;

        let message: EventMessage = serde_json::from_str(json).unwrap();

        assert_eq!(message.payload_ref(), Some(PayloadRef::new("b", "k")));
    }

    #[test]
    fn test_unknown_verb_is_rejected() {
        let message = EventMessage {
            index: "search".to_string(),
            verb: "spike".to_string(),
            ..Default::default()
        };

        let err = Event::try_from(message).unwrap_err();

        assert_eq!(err.0, "spike");
    }

    #[test]
    fn test_event_body_ignores_message_keys() {
        let json = r#"{"index": "i", "verb": "upsert", "document": {"id": "x", "site": "web"}}"#;

        let body: EventBody = serde_json::from_str(json).unwrap();

        assert_eq!(body.document.id_str(), "x");
        assert!(body.resources.is_none());
    }
}
