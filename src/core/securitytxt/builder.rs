// src/core/securitytxt/builder.rs

use tracing::debug;

use crate::core::errors::{ParseError, RecordError, RetrievalError, SyntaxError};
use crate::core::models::{Field, Format, ListField, Record};
use crate::core::securitytxt::time::parse_expires;
use crate::core::securitytxt::validators::FormatValidators;

/// What to do with the value of a given field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Multi-valued field; append in input order.
    AppendList(ListField),
    /// `Preferred-Languages`: first value wins.
    SetOnceString,
    /// `Expires`: first successfully parsed value wins.
    SetOnceTime,
    /// Accepted misspelling of a list field; stored, but flagged.
    LegacyAlias(ListField),
    /// Not a security.txt field; dropped and flagged.
    Unknown,
}

/// Dispatch table from lower-cased field name to [`Assignment`].
pub fn assignment_for(key: &str) -> Assignment {
    match key {
        "acknowledgments" => Assignment::AppendList(ListField::Acknowledgments),
        "canonical" => Assignment::AppendList(ListField::Canonical),
        "contact" => Assignment::AppendList(ListField::Contact),
        "encryption" => Assignment::AppendList(ListField::Encryption),
        "hiring" => Assignment::AppendList(ListField::Hiring),
        "policy" => Assignment::AppendList(ListField::Policy),
        "preferred-languages" => Assignment::SetOnceString,
        "expires" => Assignment::SetOnceTime,
        "acknowledgements" => Assignment::LegacyAlias(ListField::Acknowledgments),
        _ => Assignment::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Empty,
    Accumulating,
}

/// Accumulates fields and errors line by line, then turns into a [`Record`].
///
/// One builder per parse; it is consumed by [`RecordBuilder::finish`], so a
/// half-built record can never be shared between parses.
#[derive(Debug)]
pub struct RecordBuilder<'v> {
    record: Record,
    state: BuilderState,
    validators: &'v FormatValidators,
}

impl<'v> RecordBuilder<'v> {
    pub fn new(validators: &'v FormatValidators) -> Self {
        Self { record: Record::default(), state: BuilderState::Empty, validators }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn set_signed(&mut self, signed: bool) {
        self.record.signed = signed;
    }

    /// Applies one field to the record under construction.
    ///
    /// Errors describe what was wrong with the field; the record may still
    /// have been updated (the `acknowledgements` alias stores its value).
    pub fn assign(&mut self, field: &Field) -> Result<(), ParseError> {
        self.state = BuilderState::Accumulating;

        match assignment_for(&field.key) {
            Assignment::AppendList(list) => {
                self.record.list_mut(list).push(field.value.clone());
                self.check_format(field, list.format())
            }
            Assignment::LegacyAlias(list) => {
                self.record.list_mut(list).push(field.value.clone());
                Err(ParseError::Acknowledgments)
            }
            Assignment::SetOnceString => {
                if self.record.preferred_languages.is_some() {
                    return Err(ParseError::MultipleValue { field: field.key.clone() });
                }
                self.record.preferred_languages = Some(field.value.clone());
                self.check_format(field, Format::Rfc5646)
            }
            Assignment::SetOnceTime => {
                if self.record.expires.is_some() {
                    return Err(ParseError::MultipleValue { field: field.key.clone() });
                }
                let expires = parse_expires(&field.value).map_err(|e| ParseError::InvalidTime {
                    field: field.key.clone(),
                    reason: e.to_string(),
                })?;
                self.record.expires = Some(expires);
                Ok(())
            }
            Assignment::Unknown => Err(ParseError::UnknownField { field: field.key.clone() }),
        }
    }

    fn check_format(&self, field: &Field, format: Format) -> Result<(), ParseError> {
        self.validators.validate(format, &field.value).map_err(|reason| ParseError::InvalidFormat {
            field: field.key.clone(),
            format: format.to_string(),
            reason,
        })
    }

    /// Records a problem found on line `line_no`. Every such problem makes
    /// the record non-compliant.
    pub fn add_syntax_error(&mut self, line_no: usize, line: &str, cause: ParseError) {
        let err = SyntaxError { line_no, line: line.to_string(), cause };
        debug!(error = %err, "security.txt line rejected");
        self.record.parse_issues.push(err.to_string());
        self.record.errors.push(RecordError::Syntax(err));
    }

    /// Attaches a provenance problem from retrieval.
    pub fn add_retrieval_error(&mut self, err: RetrievalError) {
        self.record.parse_issues.push(err.to_string());
        self.record.errors.push(RecordError::Retrieval(err));
    }

    /// Stamps the record with where it came from and hands it over.
    pub fn finish(mut self, domain: &str, retrieved_from: &str) -> Record {
        self.record.domain = domain.to_string();
        self.record.retrieved_from = retrieved_from.to_string();
        self.record
    }
}
