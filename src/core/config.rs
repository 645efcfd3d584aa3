// src/core/config.rs

use std::time::Duration;

/// Knobs of the per-domain HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Budget for establishing the TCP connection.
    pub dial_timeout: Duration,
    /// Budget for the whole request, from connect to the last body byte.
    pub request_timeout: Duration,
    /// Budget for the TLS handshake. It is not enforced on its own: it is
    /// added to `dial_timeout`, and the sum bounds TCP connect and handshake
    /// together (see [`ClientConfig::connect_timeout`]). A stalled handshake
    /// after a fast dial therefore gets up to `dial_timeout +
    /// tls_handshake_timeout`.
    pub tls_handshake_timeout: Duration,
    /// Skip certificate verification; plenty of disclosure endpoints run on
    /// self-signed or expired certificates.
    pub insecure: bool,
    /// Reject redirects that leave the base domain of the previous hop.
    pub strict_redirect: bool,
    pub max_redirects: usize,
    /// Bodies larger than this are not worth parsing.
    pub max_body_size: usize,
    pub user_agent: String,
}

impl ClientConfig {
    /// Combined budget for the connect phase, TCP dial plus TLS handshake.
    /// The HTTP client performs the handshake inside its connector, so one
    /// deadline covers both.
    pub fn connect_timeout(&self) -> Duration {
        self.dial_timeout + self.tls_handshake_timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dial_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(10),
            tls_handshake_timeout: Duration::from_secs(5),
            insecure: false,
            strict_redirect: false,
            max_redirects: 10,
            max_body_size: 1024 * 1024,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}
