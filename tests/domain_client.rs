// tests/domain_client.rs

//! Probing real HTTP endpoints on loopback.

mod common;

use common::{COMPLIANT, Route, TestServer, UTF8_PLAIN, test_config};
use pretty_assertions::assert_eq;
use securitytxt_scanner::core::config::ClientConfig;
use securitytxt_scanner::core::errors::{RecordError, RetrievalError};
use securitytxt_scanner::core::scanner::DomainClient;

fn client(config: ClientConfig) -> DomainClient {
    DomainClient::new(&config).expect("build client")
}

#[tokio::test]
async fn test_falls_back_to_plain_http() {
    let server = TestServer::start(|_| vec![("/.well-known/security.txt", Route::ok(UTF8_PLAIN, COMPLIANT))]).await;

    let record = client(test_config())
        .get_security_txt(&server.host())
        .await
        .expect("scan")
        .expect("record");

    assert_eq!(record.domain(), server.host());
    assert_eq!(record.retrieved_from(), server.url("/.well-known/security.txt"));
    assert!(record.is_rfc_compliant(), "{:?}", record.compliance_issues());
    assert_eq!(record.contact(), &["mailto:security@example.com"]);
    // The https attempts never produce a request line.
    assert_eq!(server.hits(), vec!["/.well-known/security.txt"]);
}

#[tokio::test]
async fn test_legacy_location_is_tried_last() {
    let server = TestServer::start(|_| {
        vec![
            ("/.well-known/security.txt", Route::status(500)),
            ("/security.txt", Route::ok(UTF8_PLAIN, COMPLIANT)),
        ]
    })
    .await;

    let record = client(test_config()).get_security_txt(&server.url("/ignored")).await.unwrap().unwrap();

    assert_eq!(record.retrieved_from(), server.url("/security.txt"));
    assert_eq!(server.hits(), vec!["/.well-known/security.txt", "/security.txt"]);
}

#[tokio::test]
async fn test_no_file_anywhere() {
    let server = TestServer::start(|_| vec![("/.well-known/security.txt", Route::ok(UTF8_PLAIN, ""))]).await;

    let found = client(test_config()).get_security_txt(&server.host()).await.unwrap();

    assert!(found.is_none());
    assert_eq!(server.hits(), vec!["/.well-known/security.txt", "/security.txt"]);
}

#[tokio::test]
async fn test_wrong_content_type_is_recorded() {
    let server = TestServer::start(|_| vec![("/.well-known/security.txt", Route::ok("text/plain", COMPLIANT))]).await;

    let record = client(test_config()).get_security_txt(&server.host()).await.unwrap().unwrap();

    assert_eq!(record.contact(), &["mailto:security@example.com"]);
    assert!(!record.is_rfc_compliant());
    assert_eq!(
        record.errors(),
        &[RecordError::Retrieval(RetrievalError::ContentType("text/plain".to_string()))]
    );
}

#[tokio::test]
async fn test_oversized_body_is_skipped() {
    let big = format!("{COMPLIANT}# {}\n", "x".repeat(4096));
    let server = TestServer::start(|_| vec![("/.well-known/security.txt", Route::ok(UTF8_PLAIN, &big))]).await;

    let config = ClientConfig { max_body_size: 1024, ..test_config() };
    let found = client(config).get_security_txt(&server.host()).await.unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_strict_redirect_to_other_host_is_rejected() {
    let server = TestServer::start(|port| {
        vec![
            (
                "/.well-known/security.txt",
                Route::redirect(&format!("http://localhost:{port}/elsewhere.txt")),
            ),
            ("/security.txt", Route::ok(UTF8_PLAIN, COMPLIANT)),
            ("/elsewhere.txt", Route::ok(UTF8_PLAIN, COMPLIANT)),
        ]
    })
    .await;

    let config = ClientConfig { strict_redirect: true, ..test_config() };
    let record = client(config).get_security_txt(&server.host()).await.unwrap().unwrap();

    assert_eq!(record.retrieved_from(), server.url("/security.txt"));
    assert_eq!(
        record.errors(),
        &[RecordError::Retrieval(RetrievalError::Redirect {
            from: "127.0.0.1".to_string(),
            to: "localhost".to_string(),
        })]
    );
    assert!(!record.is_rfc_compliant());
    assert!(!server.hits().contains(&"/elsewhere.txt".to_string()));
}

#[tokio::test]
async fn test_strict_redirect_within_host_is_followed() {
    let server = TestServer::start(|port| {
        vec![
            (
                "/.well-known/security.txt",
                Route::redirect(&format!("http://127.0.0.1:{port}/elsewhere.txt")),
            ),
            ("/elsewhere.txt", Route::ok(UTF8_PLAIN, COMPLIANT)),
        ]
    })
    .await;

    let config = ClientConfig { strict_redirect: true, ..test_config() };
    let record = client(config).get_security_txt(&server.host()).await.unwrap().unwrap();

    assert!(record.is_rfc_compliant(), "{:?}", record.compliance_issues());
    // The record remembers the candidate, not where it ended up.
    assert_eq!(record.retrieved_from(), server.url("/.well-known/security.txt"));
    assert_eq!(server.hits(), vec!["/.well-known/security.txt", "/elsewhere.txt"]);
}

#[tokio::test]
async fn test_lenient_redirect_is_followed_anywhere() {
    let target = TestServer::start(|_| vec![("/policy.txt", Route::ok(UTF8_PLAIN, COMPLIANT))]).await;
    let location = target.url("/policy.txt").replace("127.0.0.1", "localhost");
    let server = TestServer::start(move |_| {
        vec![("/.well-known/security.txt", Route::redirect(&location))]
    })
    .await;

    let record = client(test_config()).get_security_txt(&server.host()).await.unwrap().unwrap();

    assert!(record.errors().is_empty());
    assert_eq!(target.hits(), vec!["/policy.txt"]);
}
