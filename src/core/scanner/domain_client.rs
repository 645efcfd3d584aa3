// src/core/scanner/domain_client.rs

use tracing::{debug, info};

use crate::core::config::ClientConfig;
use crate::core::errors::{ProbeError, RetrievalError, ScanError};
use crate::core::models::Record;
use crate::core::scanner::http::{BodyFetcher, HttpFetcher};
use crate::core::securitytxt::{FormatValidators, parse_security_txt};

/// URL schemes in the order they are tried.
pub const SCHEMES: [&str; 2] = ["https", "http"];

/// Locations in the order they are tried. The well-known path takes
/// precedence over the legacy top-level one (RFC 9116, section 3).
pub const LOCATIONS: [&str; 2] = ["/.well-known/security.txt", "/security.txt"];

/// All candidate URLs for `host`, in probing order.
pub fn candidate_urls(host: &str) -> Vec<String> {
    SCHEMES
        .iter()
        .flat_map(|scheme| LOCATIONS.iter().map(move |location| format!("{scheme}://{host}{location}")))
        .collect()
}

/// The first candidate that produced a usable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainBody {
    pub url: String,
    pub body: Vec<u8>,
    /// Provenance problems: the content type of this response, and redirects
    /// rejected while probing earlier candidates.
    pub errors: Vec<RetrievalError>,
}

/// Finds, retrieves and parses the security.txt of one domain at a time.
#[derive(Debug)]
pub struct DomainClient<F = HttpFetcher> {
    fetcher: F,
    validators: FormatValidators,
}

impl DomainClient<HttpFetcher> {
    pub fn new(config: &ClientConfig) -> Result<Self, ScanError> {
        Ok(Self::with_fetcher(HttpFetcher::new(config)?))
    }
}

impl<F: BodyFetcher> DomainClient<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher, validators: FormatValidators::default() }
    }

    #[must_use]
    pub fn with_validators(mut self, validators: FormatValidators) -> Self {
        self.validators = validators;
        self
    }

    /// Retrieves and parses the security.txt for `domain`.
    ///
    /// `domain` may carry a scheme and a path; both are stripped.
    ///
    /// # Returns
    /// * `Ok(Some(record))` - a validated record, possibly non-compliant.
    /// * `Ok(None)` - no candidate URL produced a body. This is the normal
    ///   outcome for most domains.
    /// * `Err(_)` - the input had no host, or the body was wrapped in a
    ///   broken signature envelope.
    pub async fn get_security_txt(&self, domain: &str) -> Result<Option<Record>, ScanError> {
        let host = strip_domain(domain);
        if host.is_empty() {
            return Err(ScanError::EmptyDomain { input: domain.to_string() });
        }
        if host != domain {
            debug!(input = domain, domain = host, "stripped domain");
        }

        let Some(found) = self.get_domain_body(host).await else {
            debug!(domain = host, "no security.txt found");
            return Ok(None);
        };

        let mut builder = parse_security_txt(&found.body, &self.validators).map_err(|source| {
            info!(domain = host, error = %source, "error parsing security.txt");
            ScanError::Envelope { domain: host.to_string(), source }
        })?;
        for err in found.errors {
            builder.add_retrieval_error(err);
        }

        let mut record = builder.finish(host, &found.url);
        record.validate_now();
        debug!(
            domain = host,
            url = %found.url,
            compliant = record.is_rfc_compliant(),
            "security.txt parsed"
        );
        Ok(Some(record))
    }

    /// Tries every candidate URL for `host` in order and returns the first
    /// non-empty 200 response.
    ///
    /// Failed candidates are logged and skipped; none of them is fatal.
    pub async fn get_domain_body(&self, host: &str) -> Option<DomainBody> {
        let mut rejected_redirects = Vec::new();

        for url in candidate_urls(host) {
            match self.fetcher.fetch(&url).await {
                Ok(fetched) if fetched.body.is_empty() => {
                    debug!(url = %url, "no body");
                }
                Ok(fetched) => {
                    let mut errors = rejected_redirects;
                    errors.extend(fetched.retrieval_error);
                    return Some(DomainBody { url, body: fetched.body, errors });
                }
                Err(ProbeError::RedirectRejected(err)) => {
                    debug!(url = %url, error = %err, "redirect rejected");
                    rejected_redirects.push(err);
                }
                Err(err) => {
                    debug!(url = %url, error = %err, "error retrieving");
                }
            }
        }

        None
    }
}

/// Bare host of `domain`: any `scheme://` prefix and any path removed.
pub fn strip_domain(domain: &str) -> &str {
    let domain = match domain.find("://") {
        Some(idx) => &domain[idx + 3..],
        None => domain,
    };
    domain.split('/').next().unwrap_or_default()
}
