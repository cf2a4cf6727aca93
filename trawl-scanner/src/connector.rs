use crate::error::{Result, ScanError};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, lookup_host};
use tokio_rustls::TlsConnector as RustlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::debug;

/// Opens the byte stream a single request/response cycle runs over.
///
/// The returned stream belongs to exactly one fetch and is closed when the
/// fetcher drops it.
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    fn connect(&self, host: &str, port: u16)
    -> impl Future<Output = Result<Self::Stream>> + Send;
}

/// TLS over TCP, verified against the webpki root store.
#[derive(Clone)]
pub struct TlsConnector {
    inner: RustlsConnector,
}

impl TlsConnector {
    pub fn new() -> Result<Self> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self {
            inner: RustlsConnector::from(Arc::new(config)),
        })
    }
}

impl Connector for TlsConnector {
    type Stream = TlsStream<TcpStream>;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream> {
        let tcp = open_tcp(host, port).await?;

        let server_name = ServerName::try_from(host)
            .map_err(|e| ScanError::Connection {
                target: format!("{}:{}", host, port),
                reason: format!("invalid server name: {}", e),
            })?
            .to_owned();

        let stream = self
            .inner
            .connect(server_name, tcp)
            .await
            .map_err(|e| ScanError::Connection {
                target: format!("{}:{}", host, port),
                reason: format!("TLS handshake failed: {}", e),
            })?;

        debug!("TLS session established with {}:{}", host, port);
        Ok(stream)
    }
}

/// Plain TCP. Useful against local servers that do not speak TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream> {
        open_tcp(host, port).await
    }
}

async fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| ScanError::HostResolution {
            host: host.to_string(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ScanError::HostResolution {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        });
    }

    Ok(addrs)
}

async fn open_tcp(host: &str, port: u16) -> Result<TcpStream> {
    let addrs = resolve(host, port).await?;
    debug!("Resolved {} to {:?}", host, addrs);

    TcpStream::connect(&addrs[..])
        .await
        .map_err(|e| ScanError::Connection {
            target: format!("{}:{}", host, port),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_tls_connector_builds() {
        assert!(TlsConnector::new().is_ok());
    }

    #[tokio::test]
    async fn test_tcp_connector_reaches_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"hello").await.unwrap();
        });

        let mut stream = TcpConnector.connect("127.0.0.1", port).await.unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).await.unwrap();
        assert_eq!(buf, "hello");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_resolution_error() {
        let err = TcpConnector
            .connect("no-such-host.invalid", 443)
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::HostResolution { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = TcpConnector.connect("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, ScanError::Connection { .. }));
    }
}
