// src/app/disclosure.rs

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::core::models::Record;

/// Provenance of one output entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub domain: String,
    /// `securitytxt-scanner-<version>`.
    pub source: String,
    pub retrieval_url: String,
    pub last_update: DateTime<Utc>,
}

impl Metadata {
    /// `now` is truncated to whole seconds.
    pub fn new(record: &Record, now: DateTime<Utc>) -> Self {
        Self {
            domain: record.domain().to_string(),
            source: format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            retrieval_url: record.retrieved_from().to_string(),
            last_update: truncate_to_seconds(now),
        }
    }
}

/// The JSON shape of a record, as written to the output streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    #[serde(flatten)]
    pub metadata: Metadata,

    pub contact: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<String>,
    pub canonical: Vec<String>,
    pub policy: Vec<String>,
    pub encryption: Vec<String>,
    pub acknowledgments: Vec<String>,
    pub hiring: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<FixedOffset>>,

    pub signed: bool,
    pub rfc_compliant: bool,
    pub compliance_issues: Vec<String>,
}

impl Disclosure {
    pub fn from_record(record: &Record, now: DateTime<Utc>) -> Self {
        use crate::core::models::ListField::*;

        let (contact_email, contact_url) = split_contacts(record.domain(), record.contact());

        Self {
            metadata: Metadata::new(record, now),
            contact: record.contact().to_vec(),
            contact_email,
            contact_url,
            canonical: record.list(Canonical).to_vec(),
            policy: record.list(Policy).to_vec(),
            encryption: record.list(Encryption).to_vec(),
            acknowledgments: record.acknowledgments().to_vec(),
            hiring: record.list(Hiring).to_vec(),
            preferred_languages: record.preferred_languages().map(str::to_string),
            expires: record.expires(),
            signed: record.is_signed(),
            rfc_compliant: record.is_rfc_compliant(),
            compliance_issues: record.compliance_issues(),
        }
    }
}

/// Picks the first `mailto:` address and the first web contact.
///
/// # Returns
/// `(email, url)`, where the email has its `mailto:` scheme removed.
fn split_contacts(domain: &str, contacts: &[String]) -> (Option<String>, Option<String>) {
    let mut email = None;
    let mut web = None;

    for contact in contacts {
        let parsed = match Url::parse(contact) {
            Ok(url) => url,
            Err(e) => {
                warn!(domain, contact = %contact, error = %e, "invalid uri for contact");
                continue;
            }
        };

        match parsed.scheme() {
            "mailto" if email.is_none() => email = Some(parsed.path().to_string()),
            "http" | "https" if web.is_none() => web = Some(contact.clone()),
            "mailto" | "http" | "https" => {}
            scheme => warn!(domain, scheme, "unexpected url scheme for contact"),
        }
    }

    (email, web)
}

fn truncate_to_seconds(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}
