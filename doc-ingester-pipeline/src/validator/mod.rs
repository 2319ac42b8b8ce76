//! Validator module for the document ingester pipeline.
//!
//! Checks documents against a declarative rule set. The rules are data:
//! the defaults require `id` and `site`, and deployments add index-specific
//! constraints (lengths, dates, allowed values) from configuration.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use doc_ingester_shared::Document;

/// A single broken rule: the field path and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Document fields a rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    Id,
    Site,
    Title,
    Content,
    Url,
    DataType,
    Published,
    ParentId,
    ParentTitle,
}

impl DocumentField {
    /// The wire name of the field, used as the violation path.
    pub fn path(&self) -> &'static str {
        match self {
            DocumentField::Id => "id",
            DocumentField::Site => "site",
            DocumentField::Title => "title",
            DocumentField::Content => "content",
            DocumentField::Url => "url",
            DocumentField::DataType => "data_type",
            DocumentField::Published => "published",
            DocumentField::ParentId => "parent_id",
            DocumentField::ParentTitle => "parent_title",
        }
    }

    fn value<'a>(&self, document: &'a Document) -> Option<&'a str> {
        let value = match self {
            DocumentField::Id => &document.id,
            DocumentField::Site => &document.site,
            DocumentField::Title => &document.title,
            DocumentField::Content => &document.content,
            DocumentField::Url => &document.url,
            DocumentField::DataType => &document.data_type,
            DocumentField::Published => &document.published,
            DocumentField::ParentId => &document.parent_id,
            DocumentField::ParentTitle => &document.parent_title,
        };
        value.as_deref()
    }
}

/// A constraint on one field. All but `Required` pass when the field is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Present and not blank.
    Required,
    /// At most this many characters.
    MaxLength(usize),
    /// An RFC 3339 timestamp or a `YYYY-MM-DD` date.
    Rfc3339Date,
    /// One of the listed values.
    OneOf(Vec<String>),
}

impl Rule {
    fn check(&self, value: Option<&str>) -> Option<String> {
        match (self, value) {
            (Rule::Required, Some(v)) if !v.trim().is_empty() => None,
            (Rule::Required, _) => Some("is required".to_string()),
            (_, None) => None,
            (Rule::MaxLength(max), Some(v)) => {
                let len = v.chars().count();
                (len > *max).then(|| format!("must be at most {max} characters, got {len}"))
            }
            (Rule::Rfc3339Date, Some(v)) => {
                let valid = DateTime::parse_from_rfc3339(v).is_ok()
                    || NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok();
                (!valid).then(|| format!("'{v}' is not a valid date"))
            }
            (Rule::OneOf(allowed), Some(v)) => (!allowed.iter().any(|a| a == v))
                .then(|| format!("'{v}' is not one of [{}]", allowed.join(", "))),
        }
    }
}

/// A rule bound to the field it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: DocumentField,
    pub rule: Rule,
}

impl FieldRule {
    pub fn new(field: DocumentField, rule: Rule) -> Self {
        Self { field, rule }
    }
}

/// The configured validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                FieldRule::new(DocumentField::Id, Rule::Required),
                FieldRule::new(DocumentField::Site, Rule::Required),
            ],
        }
    }
}

impl RuleSet {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Parse a JSON array of rules, e.g.
    /// `[{"field": "title", "rule": {"max_length": 500}}]`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append `other`'s rules to this set.
    pub fn extend(mut self, other: RuleSet) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

/// Checks documents against a [`RuleSet`].
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    rules: RuleSet,
    composite_site: String,
}

impl DocumentValidator {
    pub fn new(rules: RuleSet, composite_site: impl Into<String>) -> Self {
        Self {
            rules,
            composite_site: composite_site.into(),
        }
    }

    /// Check a document about to be upserted.
    ///
    /// Returns every violation, in rule order; an empty list means valid.
    /// A composite document must not itself point at a parent, since nested
    /// composites are not supported.
    pub fn validate(&self, document: &Document) -> Vec<FieldViolation> {
        let mut violations: Vec<FieldViolation> = self
            .rules
            .rules()
            .iter()
            .filter_map(|r| {
                r.rule
                    .check(r.field.value(document))
                    .map(|message| FieldViolation::new(r.field.path(), message))
            })
            .collect();

        if document.is_composite(&self.composite_site) && document.parent_id.is_some() {
            violations.push(FieldViolation::new(
                DocumentField::ParentId.path(),
                format!(
                    "a '{}' document cannot itself be a resource of another document",
                    self.composite_site
                ),
            ));
        }

        violations
    }

    /// Check a document about to be deleted: only its id matters.
    pub fn validate_for_delete(&self, document: &Document) -> Vec<FieldViolation> {
        Rule::Required
            .check(document.id.as_deref())
            .map(|message| FieldViolation::new(DocumentField::Id.path(), message))
            .into_iter()
            .collect()
    }
}

impl Default for DocumentValidator {
    fn default() -> Self {
        Self::new(RuleSet::default(), doc_ingester_shared::COMPOSITE_SITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_document() -> Document {
        Document {
            id: Some("doc-1".to_string()),
            site: Some("website".to_string()),
            title: Some("Title".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_document_has_no_violations() {
        let validator = DocumentValidator::default();

        assert!(validator.validate(&valid_document()).is_empty());
    }

    #[test]
    fn test_reports_every_missing_field() {
        let validator = DocumentValidator::default();
        let doc = Document {
            id: Some("   ".to_string()),
            site: None,
            ..Default::default()
        };

        let violations = validator.validate(&doc);

        assert_eq!(
            violations,
            vec![
                FieldViolation::new("id", "is required"),
                FieldViolation::new("site", "is required"),
            ]
        );
    }

    #[test]
    fn test_configured_rules_from_json() {
        let extra = RuleSet::from_json(
            r#"[
                {"field": "title", "rule": {"max_length": 5}},
                {"field": "published", "rule": "rfc3339_date"},
                {"field": "data_type", "rule": {"one_of": ["Dataset", "Publication"]}}
            ]"#,
        )
        .unwrap();
        let validator = DocumentValidator::new(RuleSet::default().extend(extra), "datahub");

        let mut doc = valid_document();
        doc.title = Some("Too long a title".to_string());
        doc.published = Some("last tuesday".to_string());
        doc.data_type = Some("Map".to_string());

        let violations = validator.validate(&doc);
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();

        assert_eq!(fields, vec!["title", "published", "data_type"]);
    }

    #[test]
    fn test_optional_rules_pass_when_field_absent() {
        let extra = RuleSet::new(vec![
            FieldRule::new(DocumentField::Published, Rule::Rfc3339Date),
            FieldRule::new(DocumentField::Title, Rule::MaxLength(1)),
        ]);
        let validator = DocumentValidator::new(RuleSet::default().extend(extra), "datahub");
        let mut doc = valid_document();
        doc.title = None;

        assert!(validator.validate(&doc).is_empty());
    }

    #[test]
    fn test_date_formats() {
        assert!(Rule::Rfc3339Date.check(Some("2021-03-04")).is_none());
        assert!(Rule::Rfc3339Date.check(Some("2021-03-04T10:00:00Z")).is_none());
        assert!(Rule::Rfc3339Date.check(Some("04/03/2021")).is_some());
    }

    #[test]
    fn test_nested_composite_is_rejected() {
        let validator = DocumentValidator::default();
        let mut doc = valid_document();
        doc.site = Some("datahub".to_string());
        doc.parent_id = Some("other".to_string());

        let violations = validator.validate(&doc);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "parent_id");
    }

    #[test]
    fn test_delete_only_requires_id() {
        let validator = DocumentValidator::default();

        let doc = Document {
            id: Some("doc-1".to_string()),
            ..Default::default()
        };
        assert!(validator.validate_for_delete(&doc).is_empty());

        let violations = validator.validate_for_delete(&Document::default());
        assert_eq!(violations, vec![FieldViolation::new("id", "is required")]);
    }
}
