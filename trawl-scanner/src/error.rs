use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("The URL {input} is not valid: {reason}")]
    MalformedUrl { input: String, reason: String },

    #[error("Host {host} couldn't be determined: {source}")]
    HostResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error with socket connection: {target} - {reason}")]
    Connection { target: String, reason: String },

    #[error("Couldn't retrieve page at {url} - {source}")]
    Read {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server returned error: {status_line}")]
    NonSuccessStatus { url: String, status_line: String },

    #[error("TLS configuration error: {0}")]
    Tls(#[from] tokio_rustls::rustls::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
