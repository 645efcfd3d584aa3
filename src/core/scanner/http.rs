// src/core/scanner/http.rs

use std::future::Future;

use reqwest::header::{CONNECTION, CONTENT_TYPE, HeaderMap};
use reqwest::redirect::{Attempt, Policy};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::core::config::ClientConfig;
use crate::core::errors::{ProbeError, RetrievalError, ScanError};

/// A body retrieved with status 200, plus any provenance problem that did
/// not stop us from reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    pub body: Vec<u8>,
    pub retrieval_error: Option<RetrievalError>,
}

/// Retrieves a single candidate URL.
///
/// The domain client only talks to this trait, which keeps the probing order
/// testable without a network.
pub trait BodyFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedBody, ProbeError>> + Send;
}

/// [`BodyFetcher`] backed by a `reqwest` client that never reuses connections.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_size: usize,
}

impl HttpFetcher {
    /// Builds the underlying client from `config`.
    ///
    /// Idle connections are never kept, so every probe dials (and, for https,
    /// handshakes) on its own and nothing is pinned across hosts reached by
    /// redirects.
    pub fn new(config: &ClientConfig) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.insecure)
            .pool_max_idle_per_host(0)
            .redirect(redirect_policy(config.strict_redirect, config.max_redirects))
            .build()
            .map_err(ScanError::Client)?;

        Ok(Self { client, max_body_size: config.max_body_size })
    }
}

impl BodyFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody, ProbeError> {
        debug!(url, "retrieving");
        let mut response = self
            .client
            .get(url)
            .header(CONNECTION, "close")
            .send()
            .await
            .map_err(ProbeError::from_request)?;

        if response.status() != StatusCode::OK {
            return Err(ProbeError::Status(response.status().as_u16()));
        }

        let content_type = content_type(response.headers());

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(ProbeError::from_request)? {
            if body.len() + chunk.len() > self.max_body_size {
                warn!(url, limit = self.max_body_size, "body too large, giving up");
                return Err(ProbeError::BodyTooLarge { limit: self.max_body_size });
            }
            body.extend_from_slice(&chunk);
        }

        let retrieval_error = if is_expected_content_type(&content_type) {
            None
        } else {
            debug!(url, content_type = %content_type, "unexpected content type");
            Some(RetrievalError::ContentType(content_type))
        };

        Ok(FetchedBody { body, retrieval_error })
    }
}

fn content_type(headers: &HeaderMap) -> String {
    match headers.get(CONTENT_TYPE).map(|v| v.to_str()) {
        Some(Ok(s)) => s.to_string(),
        Some(Err(_)) => "[Invalid UTF-8]".to_string(),
        None => String::new(),
    }
}

/// `text/plain` with a `charset=utf-8` parameter, compared the way MIME
/// compares them: case-insensitively and ignoring whitespace and quotes.
pub fn is_expected_content_type(value: &str) -> bool {
    let mut parts = value.split(';').map(str::trim);
    let media_type = parts.next().unwrap_or_default();
    if !media_type.eq_ignore_ascii_case("text/plain") {
        return false;
    }
    parts.any(|param| {
        param.split_once('=').is_some_and(|(name, value)| {
            name.trim().eq_ignore_ascii_case("charset")
                && value.trim().trim_matches('"').eq_ignore_ascii_case("utf-8")
        })
    })
}

// --- Redirect policy ---

/// Redirect policy applied on every hop of every probe.
pub fn redirect_policy(strict: bool, max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| on_redirect(attempt, strict, max_redirects))
}

fn on_redirect(attempt: Attempt<'_>, strict: bool, max_redirects: usize) -> reqwest::redirect::Action {
    let hops = attempt.previous().len();
    let decision = match attempt.previous().last() {
        Some(from) => check_redirect(from, attempt.url(), strict),
        None => Ok(()),
    };

    if hops > max_redirects {
        warn!(hops, "too many redirects, stopping");
        return attempt.stop();
    }
    match decision {
        Ok(()) => attempt.follow(),
        Err(e) => attempt.error(e),
    }
}

/// Decides whether the hop `from` → `to` may be followed. Every hop is logged.
///
/// In strict mode the base domains of both hosts must match, so a disclosure
/// endpoint cannot bounce the scanner to a host controlled by someone else.
pub fn check_redirect(from: &Url, to: &Url, strict: bool) -> Result<(), RetrievalError> {
    info!(from = %from, to = %to, "redirecting");

    if !strict {
        return Ok(());
    }

    let from_base = base_domain(from.host_str().unwrap_or_default());
    let to_base = base_domain(to.host_str().unwrap_or_default());
    if from_base != to_base {
        warn!(from = %from_base, to = %to_base, "redirect leaves base domain, rejecting");
        return Err(RetrievalError::Redirect { from: from_base.to_string(), to: to_base.to_string() });
    }
    Ok(())
}

/// The registrable-looking part of `host`: its last two labels.
///
/// Hosts with fewer than two labels, and hosts whose last label starts with
/// a digit (IP literals), are returned whole. Public-suffix rules are not
/// consulted, so `a.example.co.uk` and `b.other.co.uk` share `co.uk`.
pub fn base_domain(host: &str) -> &str {
    let host = host.strip_suffix('.').unwrap_or(host);

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return host;
    }
    let last = labels[labels.len() - 1];
    if last.starts_with(|c: char| c.is_ascii_digit()) {
        return host;
    }

    let keep = labels[labels.len() - 2].len() + 1 + last.len();
    &host[host.len() - keep..]
}
