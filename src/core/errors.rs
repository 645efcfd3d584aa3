// src/core/errors.rs

//! Error taxonomy for the fetch-and-parse pipeline.
//!
//! Most of these never abort anything: line-level and validation errors are
//! collected on the [`Record`](crate::core::models::Record) so the compliance
//! report can say *why* a file is broken. Only [`EnvelopeError`] ends the
//! parse of a single domain, and only [`PoolError`] ends a run.

use thiserror::Error;

/// A problem with one line of a security.txt body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no ':' found to separate field-name and value, as per section 3.6.8 of RFC 5322")]
    Separator,

    #[error("field-name should be printable US-ASCII except space and :, as per section 3.6.8 of RFC 5322")]
    FieldName,

    #[error("value should be printable US-ASCII except space, as per 'unstructured' syntax in section 3.2.5 of RFC 5322")]
    Value,

    #[error("value cannot be empty")]
    EmptyValue,

    #[error("invalid field name 'acknowledgements', should be 'acknowledgments' as per section 2.5.1 of RFC 9116")]
    Acknowledgments,

    #[error("invalid time in field '{field}' according to section 3.3 of RFC 5322: {reason}")]
    InvalidTime { field: String, reason: String },

    #[error("multiple values for field '{field}', expecting one value as per section 2.5 of RFC 9116")]
    MultipleValue { field: String },

    #[error("unexpected field-name '{field}', as per section 2.5 of RFC 9116")]
    UnknownField { field: String },

    #[error("value of field '{field}' is not a valid {format}: {reason}")]
    InvalidFormat {
        field: String,
        format: String,
        reason: String,
    },
}

/// A [`ParseError`] tied to the line it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error in line {line_no}: {cause}")]
pub struct SyntaxError {
    /// 1-based line number within the (de-armored) message.
    pub line_no: usize,
    /// The raw line as it appeared in the body.
    pub line: String,
    #[source]
    pub cause: ParseError,
}

/// Record-level checks run once every line has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Mandatory field 'Contact' not present as per section 2.5.3 of RFC 9116")]
    MissingContact,

    #[error("Mandatory field 'Expires' not present as per section 2.5.5 of RFC 9116")]
    MissingExpires,

    #[error("The security.txt file has expired as per section 2.5.5 of RFC 9116")]
    Expired,
}

/// Provenance problems found while retrieving a body that was still usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("invalid Content-Type of '{0}', expecting 'text/plain; charset=utf-8' as per section 3 of RFC 9116")]
    ContentType(String),

    #[error("redirect from {from} to {to}, prohibiting redirect to different hostname")]
    Redirect { from: String, to: String },
}

/// Everything that ends up in a record's error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

/// The clearsign armor was present but could not be unwrapped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("missing blank line after armor headers of the signed message")]
    MissingHeaderSeparator,

    #[error("signed message has no '-----BEGIN PGP SIGNATURE-----' block")]
    MissingSignature,

    #[error("signature block is not terminated by '-----END PGP SIGNATURE-----'")]
    UnterminatedSignature,

    #[error("signature block is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("signature block is empty")]
    EmptySignature,

    #[error("signature block does not start with an OpenPGP signature packet (tag byte {0:#04x})")]
    NotASignaturePacket(u8),

    #[error("armor checksum mismatch: expected {expected:06x}, computed {actual:06x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("armor checksum line '{0}' is malformed")]
    InvalidChecksum(String),
}

/// Why a single candidate URL did not produce a body.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("redirect rejected: {0}")]
    RedirectRejected(RetrievalError),

    #[error("unable to retrieve, returned status {0}")]
    Status(u16),

    #[error("body exceeds the limit of {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl ProbeError {
    /// Classifies a transport error, pulling out redirects rejected by our own
    /// redirect policy so they can be reported on the record.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_redirect() {
            let mut source = std::error::Error::source(&err);
            while let Some(inner) = source {
                if let Some(rejected) = inner.downcast_ref::<RetrievalError>() {
                    return ProbeError::RedirectRejected(rejected.clone());
                }
                source = inner.source();
            }
        }
        ProbeError::Request(err)
    }
}

/// Per-domain failures surfaced by the domain client.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no host left after normalizing input '{input}'")]
    EmptyDomain { input: String },

    #[error("malformed signed security.txt for {domain}: {source}")]
    Envelope {
        domain: String,
        #[source]
        source: EnvelopeError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ScanError {
    /// Only a broken client is worth stopping the whole run for; everything
    /// else is scoped to one domain.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::Client(_))
    }
}

/// Unrecoverable worker-pool conditions, signalled once per run.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool needs at least one worker")]
    NoWorkers,

    #[error("output queue closed while workers were still producing records")]
    OutputClosed,

    #[error("fatal scan error: {0}")]
    Scan(#[from] ScanError),
}
