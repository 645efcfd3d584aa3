// src/cli.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use securitytxt_scanner::app::RunConfig;
use securitytxt_scanner::core::config::ClientConfig;

/// Reads domains from stdin, one per line, and writes a JSON array of the
/// security.txt records found to stdout.
///
/// Ctrl-C aborts in-flight requests and still closes the JSON array. A read
/// from an interactive terminal is abandoned rather than waited for.
#[derive(Parser, Debug)]
#[command(name = "securitytxt-scanner", version, about)]
pub struct Cli {
    #[arg(short = 't', long, default_value_t = 8, help = "Number of concurrent workers")]
    pub threads: usize,

    #[arg(long, help = "Reject redirects that leave the base domain of the previous hop")]
    pub strict_redirect: bool,

    #[arg(long, help = "Skip TLS certificate verification")]
    pub insecure: bool,

    #[arg(long, default_value_t = 20, value_name = "SECONDS", help = "TCP connect timeout")]
    pub dial_timeout: u64,

    #[arg(long, default_value_t = 10, value_name = "SECONDS", help = "Timeout for a whole request")]
    pub request_timeout: u64,

    #[arg(long, default_value_t = 5, value_name = "SECONDS", help = "TLS handshake timeout, added to the dial timeout")]
    pub tls_handshake_timeout: u64,

    #[arg(long, value_name = "PATH", help = "Also write non-compliant records to this JSON file")]
    pub non_compliant_output: Option<PathBuf>,

    #[arg(long, help = "Log at debug level unless RUST_LOG says otherwise")]
    pub debug: bool,

    #[arg(long, help = "Also write logs to a file in the local data directory")]
    pub log_file: bool,
}

impl Cli {
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            workers: self.threads,
            non_compliant_output: self.non_compliant_output,
            client: ClientConfig {
                dial_timeout: Duration::from_secs(self.dial_timeout),
                request_timeout: Duration::from_secs(self.request_timeout),
                tls_handshake_timeout: Duration::from_secs(self.tls_handshake_timeout),
                insecure: self.insecure,
                strict_redirect: self.strict_redirect,
                ..ClientConfig::default()
            },
            ..RunConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_library_defaults() {
        let config = Cli::parse_from(["securitytxt-scanner"]).into_config();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_flags() {
        let config = Cli::parse_from([
            "securitytxt-scanner",
            "-t",
            "32",
            "--strict-redirect",
            "--insecure",
            "--request-timeout",
            "3",
            "--non-compliant-output",
            "bad.json",
        ])
        .into_config();

        assert_eq!(config.workers, 32);
        assert!(config.client.strict_redirect);
        assert!(config.client.insecure);
        assert_eq!(config.client.request_timeout, Duration::from_secs(3));
        assert_eq!(config.non_compliant_output, Some(PathBuf::from("bad.json")));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
