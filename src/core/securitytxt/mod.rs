// src/core/securitytxt/mod.rs

//! Turning raw security.txt bytes into a [`RecordBuilder`].
//!
//! The body is first stripped of an optional clearsign envelope, then fed
//! line by line through the field parser into the builder. Callers stamp
//! the result with its origin via [`RecordBuilder::finish`] and validate it.

pub mod builder;
pub mod parser;
pub mod signed_message;
pub mod time;
pub mod validators;

pub use builder::{Assignment, BuilderState, RecordBuilder, assignment_for};
pub use parser::{parse_line, parse_message};
pub use signed_message::SignedMessage;
pub use time::{ExpiresError, parse_expires};
pub use validators::FormatValidators;

use crate::core::errors::EnvelopeError;

/// Parses a retrieved body.
///
/// Only a malformed signature envelope is an error; everything else wrong
/// with the body ends up on the builder.
pub fn parse_security_txt<'v>(
    body: &[u8],
    validators: &'v FormatValidators,
) -> Result<RecordBuilder<'v>, EnvelopeError> {
    let message = SignedMessage::decode(body)?;

    let mut builder = RecordBuilder::new(validators);
    builder.set_signed(message.is_signed());
    parse_message(message.message(), &mut builder);

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::securitytxt::signed_message::tests::{FAKE_SIGNATURE, armor};

    #[test]
    fn test_signed_body_is_parsed() {
        let body = armor(
            "# Our security policy\nContact: mailto:security@example.com\nExpires: 2999-01-01T00:00:00Z",
            FAKE_SIGNATURE,
            true,
        );
        let validators = FormatValidators::default();
        let mut record = parse_security_txt(body.as_bytes(), &validators)
            .unwrap()
            .finish("example.com", "https://example.com/.well-known/security.txt");
        record.validate_now();

        assert!(record.is_signed());
        assert!(record.is_rfc_compliant(), "{:?}", record.compliance_issues());
        assert_eq!(record.contact(), &["mailto:security@example.com"]);
    }

    #[test]
    fn test_broken_envelope_is_an_error() {
        let body = b"-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\nContact: mailto:a@example.com\n";
        let validators = FormatValidators::default();
        assert_eq!(
            parse_security_txt(body, &validators).unwrap_err(),
            EnvelopeError::MissingSignature
        );
    }

    #[test]
    fn test_html_page_yields_partial_record() {
        let body = b"<!doctype html>\n<html><body>Not Found</body></html>\n";
        let validators = FormatValidators::default();
        let mut record = parse_security_txt(body, &validators).unwrap().finish("example.com", "");
        record.validate_now();
        assert!(!record.is_signed());
        assert!(!record.is_rfc_compliant());
        // Two separator errors plus the missing Contact and Expires.
        assert_eq!(record.compliance_issues().len(), 4);
    }
}
