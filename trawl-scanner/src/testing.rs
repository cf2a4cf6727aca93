//! In-memory transport for engine tests.

use crate::connector::Connector;
use crate::crawl_url::CrawlUrl;
use crate::error::{Result, ScanError};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";

/// Serves canned responses keyed by (host, request path).
#[derive(Default)]
pub struct MemoryConnector {
    pages: HashMap<(String, String), String>,
    unresolvable: HashSet<String>,
    refused: HashSet<String>,
    unreachable: HashSet<String>,
    silent: HashSet<String>,
    stalled: HashSet<String>,
    connects: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw response (status line, headers, body) for `url`.
    pub fn page(mut self, url: &str, response: impl Into<String>) -> Self {
        let url = CrawlUrl::parse(url).unwrap();
        self.pages
            .insert((url.connect_host(), url.document_path()), response.into());
        self
    }

    /// A `200 OK` HTML page made of `lines`.
    pub fn html(self, url: &str, lines: &[&str]) -> Self {
        self.page(url, ok_response(lines))
    }

    pub fn unresolvable(mut self, host: &str) -> Self {
        self.unresolvable.insert(host.to_string());
        self
    }

    pub fn refused(mut self, host: &str) -> Self {
        self.refused.insert(host.to_string());
        self
    }

    /// Connect never completes.
    pub fn unreachable(mut self, host: &str) -> Self {
        self.unreachable.insert(host.to_string());
        self
    }

    /// Accepts the request, never answers.
    pub fn silent(mut self, host: &str) -> Self {
        self.silent.insert(host.to_string());
        self
    }

    /// Writes the response, then keeps the connection open without closing.
    pub fn stalled(mut self, host: &str) -> Self {
        self.stalled.insert(host.to_string());
        self
    }

    /// `host:port` of every connection attempt, in order.
    pub fn connects(&self) -> Arc<Mutex<Vec<String>>> {
        self.connects.clone()
    }

    /// Raw request text of every request served, in order.
    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        self.requests.clone()
    }
}

pub fn ok_response(lines: &[&str]) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n{}\r\n",
        lines.join("\r\n")
    )
}

impl Connector for MemoryConnector {
    type Stream = DuplexStream;

    async fn connect(&self, host: &str, port: u16) -> Result<DuplexStream> {
        self.connects
            .lock()
            .unwrap()
            .push(format!("{}:{}", host, port));

        if self.unresolvable.contains(host) {
            return Err(ScanError::HostResolution {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such host"),
            });
        }
        if self.refused.contains(host) {
            return Err(ScanError::Connection {
                target: format!("{}:{}", host, port),
                reason: "connection refused".to_string(),
            });
        }
        if self.unreachable.contains(host) {
            std::future::pending::<()>().await;
        }

        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let pages = self.pages.clone();
        let requests = self.requests.clone();
        let silent = self.silent.contains(host);
        let stalled = self.stalled.contains(host);
        let host = host.to_string();

        tokio::spawn(async move {
            let request = read_request(&mut server).await;
            requests.lock().unwrap().push(request.clone());
            if silent {
                std::future::pending::<()>().await;
            }

            let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
            let response = pages
                .get(&(host, path))
                .cloned()
                .unwrap_or_else(|| NOT_FOUND.to_string());

            let _ = server.write_all(response.as_bytes()).await;
            if stalled {
                std::future::pending::<()>().await;
            }
            let _ = server.shutdown().await;
        });

        Ok(client)
    }
}

async fn read_request(stream: &mut DuplexStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
