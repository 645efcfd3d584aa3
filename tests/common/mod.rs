// tests/common/mod.rs

//! A throwaway plain-HTTP responder for exercising real probes.
//!
//! It only understands `GET` request heads and drops anything else on the
//! floor, which makes TLS handshakes against it fail fast. That is exactly
//! what the https candidates should see.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use securitytxt_scanner::core::config::ClientConfig;

pub const COMPLIANT: &str = "# test file\nContact: mailto:security@example.com\nExpires: 2999-01-01T00:00:00Z\nPolicy: https://example.com/policy\n";
pub const UTF8_PLAIN: &str = "text/plain; charset=utf-8";

/// Client settings tuned for loopback tests.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        dial_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        tls_handshake_timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Route {
    pub fn ok(content_type: &str, body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self { status: 302, headers: vec![("Location".to_string(), location.to_string())], body: Vec::new() }
    }

    pub fn status(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Binds a loopback port and serves the routes built for it. Unknown
    /// paths get a 404.
    pub async fn start(routes: impl FnOnce(u16) -> Vec<(&'static str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("local address");

        let routes: Arc<HashMap<String, Route>> =
            Arc::new(routes(addr.port()).into_iter().map(|(p, r)| (p.to_string(), r)).collect());
        let hits = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let hits = Arc::clone(&hits);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(respond(stream, Arc::clone(&routes), Arc::clone(&hits)));
                }
            })
        };

        Self { addr, hits, handle }
    }

    /// `127.0.0.1:<port>`, usable as a scan input.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Paths requested so far, in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(mut stream: TcpStream, routes: Arc<HashMap<String, Route>>, hits: Arc<Mutex<Vec<String>>>) {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        head.extend_from_slice(&chunk[..n]);

        let prefix = &head[..head.len().min(4)];
        if !b"GET ".starts_with(prefix) {
            return;
        }
        if head.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let head = String::from_utf8_lossy(&head);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    hits.lock().unwrap().push(path.clone());

    let route = routes.get(&path).cloned().unwrap_or_else(|| Route::status(404));
    let reason = if route.status == 200 { "OK" } else { "Test" };
    let mut response = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status,
        route.body.len()
    );
    for (name, value) in &route.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");

    let mut bytes = response.into_bytes();
    bytes.extend_from_slice(&route.body);
    let _ = stream.write_all(&bytes).await;
    let _ = stream.shutdown().await;
}
