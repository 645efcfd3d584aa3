// src/core/models.rs

use chrono::{DateTime, FixedOffset, Utc};
use strum::{AsRefStr, Display};

use crate::core::errors::{RecordError, ValidationError};

// --- Field Models ---

/// One `name: value` pair pulled from a security.txt line.
///
/// The key is already lower-cased and right-trimmed, the value trimmed on
/// both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
}

impl Field {
    pub fn new(key: &str, value: &str) -> Self {
        Self { key: key.to_string(), value: value.to_string() }
    }
}

/// Syntax a field value is expected to follow. Used as the key of the
/// format-validator registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum Format {
    #[strum(serialize = "secure-url")]
    SecureUrl,
    #[strum(serialize = "contact-uri")]
    ContactUri,
    #[strum(serialize = "key-uri")]
    KeyUri,
    #[strum(serialize = "rfc5646")]
    Rfc5646,
}

/// The fields that may appear any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListField {
    Acknowledgments,
    Canonical,
    Contact,
    Encryption,
    Hiring,
    Policy,
}

impl ListField {
    pub fn format(self) -> Format {
        match self {
            ListField::Contact => Format::ContactUri,
            ListField::Encryption => Format::KeyUri,
            ListField::Acknowledgments
            | ListField::Canonical
            | ListField::Hiring
            | ListField::Policy => Format::SecureUrl,
        }
    }
}

// --- Record Model ---

/// A parsed security.txt plus everything that was wrong with it.
///
/// Records are produced by [`RecordBuilder::finish`](crate::core::securitytxt::RecordBuilder::finish)
/// and are read-only afterwards, apart from [`Record::validate`], which
/// only ever replaces its own findings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub(crate) domain: String,
    pub(crate) retrieved_from: String,
    pub(crate) signed: bool,

    pub(crate) acknowledgments: Vec<String>,
    pub(crate) canonical: Vec<String>,
    pub(crate) contact: Vec<String>,
    pub(crate) encryption: Vec<String>,
    pub(crate) hiring: Vec<String>,
    pub(crate) policy: Vec<String>,

    pub(crate) preferred_languages: Option<String>,
    pub(crate) expires: Option<DateTime<FixedOffset>>,

    pub(crate) errors: Vec<RecordError>,
    pub(crate) parse_issues: Vec<String>,
    pub(crate) validation_issues: Vec<ValidationError>,
}

impl Record {
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn retrieved_from(&self) -> &str {
        &self.retrieved_from
    }

    /// Whether the body was wrapped in a clearsign envelope. The signature
    /// itself is not verified.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Acknowledgments => &self.acknowledgments,
            ListField::Canonical => &self.canonical,
            ListField::Contact => &self.contact,
            ListField::Encryption => &self.encryption,
            ListField::Hiring => &self.hiring,
            ListField::Policy => &self.policy,
        }
    }

    pub(crate) fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Acknowledgments => &mut self.acknowledgments,
            ListField::Canonical => &mut self.canonical,
            ListField::Contact => &mut self.contact,
            ListField::Encryption => &mut self.encryption,
            ListField::Hiring => &mut self.hiring,
            ListField::Policy => &mut self.policy,
        }
    }

    pub fn contact(&self) -> &[String] {
        &self.contact
    }

    pub fn acknowledgments(&self) -> &[String] {
        &self.acknowledgments
    }

    pub fn preferred_languages(&self) -> Option<&str> {
        self.preferred_languages.as_deref()
    }

    pub fn expires(&self) -> Option<DateTime<FixedOffset>> {
        self.expires
    }

    /// Structural problems in input order: per-line syntax errors followed by
    /// retrieval errors.
    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }

    /// Only meaningful once [`Record::validate`] has run.
    pub fn is_rfc_compliant(&self) -> bool {
        self.parse_issues.is_empty() && self.validation_issues.is_empty()
    }

    /// Parse-time issues first, then the findings of the last validation.
    pub fn compliance_issues(&self) -> Vec<String> {
        self.parse_issues
            .iter()
            .cloned()
            .chain(self.validation_issues.iter().map(ToString::to_string))
            .collect()
    }

    /// Checks the record-level rules of RFC 9116 against `now`.
    ///
    /// A missing `Contact`, a missing `Expires` and an `Expires` that is not
    /// strictly after `now` are reported independently. Running it again
    /// replaces the previous findings instead of adding to them.
    ///
    /// # Returns
    /// The validation findings, empty when all checks pass.
    pub fn validate(&mut self, now: DateTime<Utc>) -> &[ValidationError] {
        let mut issues = Vec::new();

        if self.contact.is_empty() {
            issues.push(ValidationError::MissingContact);
        }

        match self.expires {
            None => issues.push(ValidationError::MissingExpires),
            Some(expires) if expires <= now => issues.push(ValidationError::Expired),
            Some(_) => {}
        }

        self.validation_issues = issues;
        &self.validation_issues
    }

    pub fn validate_now(&mut self) -> &[ValidationError] {
        self.validate(Utc::now())
    }
}
