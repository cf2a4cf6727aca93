use crate::connector::Connector;
use crate::crawl_url::CrawlUrl;
use crate::error::{Result, ScanError};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::time::{self, Instant};
use tracing::debug;

pub const HTTPS_PORT: u16 = 443;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound on one page, from connect to the last line.
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(60);
/// Longer lines are handed out in pieces of this size.
pub const MAX_LINE_BYTES: u64 = 64 * 1024;
pub const SUCCESS_STATUS_LINE: &str = "HTTP/1.1 200 OK";

/// Decides whether a response status line counts as a usable page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only the literal `HTTP/1.1 200 OK`.
    #[default]
    Exact,
    /// Any `HTTP/<version> 200`, whatever the reason phrase.
    Lenient,
}

impl StatusPolicy {
    pub fn accepts(&self, status_line: &str) -> bool {
        match self {
            StatusPolicy::Exact => status_line == SUCCESS_STATUS_LINE,
            StatusPolicy::Lenient => {
                let mut parts = status_line.split_whitespace();
                let version_ok = parts.next().is_some_and(|v| v.starts_with("HTTP/"));
                version_ok && parts.next() == Some("200")
            }
        }
    }
}

/// Issues one `GET` per call over a fresh connection.
pub struct Fetcher<C> {
    connector: C,
    timeout: Duration,
}

impl<C: Connector> Fetcher<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connects to the URL's host, sends the request and hands back the
    /// unread response. Nothing of the body is read here.
    pub async fn fetch(&self, url: &CrawlUrl) -> Result<ResponseLines<C::Stream>> {
        let started = Instant::now();
        let host = url.connect_host();
        let port = url.port().unwrap_or(HTTPS_PORT);
        debug!("Connecting to {}:{} for {}", host, port, url);

        let mut stream = match time::timeout(self.timeout, self.connector.connect(&host, port)).await
        {
            Ok(connected) => connected?,
            Err(_) => {
                return Err(ScanError::Connection {
                    target: url.to_string(),
                    reason: format!("connect timed out after {:?}", self.timeout),
                });
            }
        };

        let request = build_request(url);
        let sent = time::timeout(self.timeout, async {
            stream.write_all(request.as_bytes()).await?;
            stream.flush().await
        })
        .await;

        match sent {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ScanError::Connection {
                    target: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ScanError::Connection {
                    target: url.to_string(),
                    reason: format!("request timed out after {:?}", self.timeout),
                });
            }
        }

        Ok(ResponseLines::new(stream, url.to_string(), self.timeout)
            .with_deadline(started + DEFAULT_PAGE_TIMEOUT))
    }
}

/// The request line and headers for `url`, CRLF terminated.
pub fn build_request(url: &CrawlUrl) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        url.document_path(),
        url.authority()
    )
}

/// Response text read lazily, one line at a time, until the peer closes.
///
/// Owns the connection; dropping it closes the stream.
pub struct ResponseLines<S> {
    reader: BufReader<S>,
    url: String,
    timeout: Duration,
    deadline: Option<Instant>,
    buf: Vec<u8>,
    done: bool,
}

impl<S: AsyncRead + Unpin> ResponseLines<S> {
    pub fn new(stream: S, url: String, timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(stream),
            url,
            timeout,
            deadline: None,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Fails the next read once `deadline` has passed, however steadily
    /// the peer is still sending.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Next line without its terminator, or `None` once the peer has closed.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        if self.done {
            return Ok(None);
        }

        self.buf.clear();
        if self.deadline_passed() {
            return Err(self.timed_out("page not complete before its deadline".to_string()));
        }
        let wait = match self.deadline {
            Some(deadline) => self.timeout.min(deadline.saturating_duration_since(Instant::now())),
            None => self.timeout,
        };
        let read = time::timeout(
            wait,
            (&mut self.reader)
                .take(MAX_LINE_BYTES)
                .read_until(b'\n', &mut self.buf),
        )
        .await;

        match read {
            Ok(Ok(0)) => {
                self.done = true;
                return Ok(None);
            }
            Ok(Ok(_)) => {}
            // TLS peers often close without close_notify after `Connection: close`.
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!("{} closed without close_notify", self.url);
                self.done = true;
                if self.buf.is_empty() {
                    return Ok(None);
                }
            }
            Ok(Err(source)) => {
                return Err(ScanError::Read {
                    url: self.url.clone(),
                    source,
                });
            }
            Err(_) if self.deadline_passed() => {
                return Err(self.timed_out("page not complete before its deadline".to_string()));
            }
            Err(_) => {
                return Err(self.timed_out(format!("no data within {:?}", self.timeout)));
            }
        }

        Ok(Some(decode_line(&self.buf)))
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn timed_out(&self, reason: String) -> ScanError {
        ScanError::Read {
            url: self.url.clone(),
            source: io::Error::new(io::ErrorKind::TimedOut, reason),
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let line = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
