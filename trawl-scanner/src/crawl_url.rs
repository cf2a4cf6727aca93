use crate::error::{Result, ScanError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::{Host, Url};

/// A crawl target.
///
/// Identity is the canonical string: the input with surrounding whitespace
/// trimmed and nothing else changed. `https://a.test` and `https://a.test/`
/// are different targets even though they address the same document.
#[derive(Debug, Clone)]
pub struct CrawlUrl {
    raw: String,
    parsed: Url,
}

impl CrawlUrl {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let parsed = Url::parse(raw).map_err(|e| ScanError::MalformedUrl {
            input: raw.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => {
                return Err(ScanError::MalformedUrl {
                    input: raw.to_string(),
                    reason: "missing host".to_string(),
                });
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Host as it appears in the authority (IPv6 literals keep their brackets).
    pub fn host(&self) -> &str {
        self.parsed.host_str().unwrap_or_default()
    }

    /// Host in the form a resolver expects.
    pub fn connect_host(&self) -> String {
        match self.parsed.host() {
            Some(Host::Ipv6(addr)) => addr.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Domain(domain)) => domain.to_string(),
            None => String::new(),
        }
    }

    /// Port written explicitly in the URL, if any.
    pub fn port(&self) -> Option<u16> {
        self.parsed.port()
    }

    /// Value for the `Host` request header.
    pub fn authority(&self) -> String {
        match self.port() {
            Some(port) => format!("{}:{}", self.host(), port),
            None => self.host().to_string(),
        }
    }

    /// Path plus query, `/` when the path is empty. Fragments are never sent.
    pub fn document_path(&self) -> String {
        let path = self.parsed.path();
        let mut doc = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };
        if let Some(query) = self.parsed.query() {
            doc.push('?');
            doc.push_str(query);
        }
        doc
    }
}

impl PartialEq for CrawlUrl {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for CrawlUrl {}

impl Hash for CrawlUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for CrawlUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for CrawlUrl {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for CrawlUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_input_verbatim() {
        let url = CrawlUrl::parse("https://Example.com").unwrap();
        assert_eq!(url.as_str(), "https://Example.com");
        assert_eq!(url.host(), "example.com");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let url = CrawlUrl::parse("  https://example.com/a \n").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_equality_is_string_identity() {
        let a = CrawlUrl::parse("https://example.com").unwrap();
        let b = CrawlUrl::parse("https://example.com/").unwrap();
        let c = CrawlUrl::parse("https://example.com").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_parse_rejects_relative() {
        let err = CrawlUrl::parse("/just/a/path").unwrap_err();
        assert!(matches!(err, ScanError::MalformedUrl { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_host() {
        let err = CrawlUrl::parse("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, ScanError::MalformedUrl { .. }));
        assert!(err.to_string().contains("missing host"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CrawlUrl::parse("not a url").is_err());
        assert!(CrawlUrl::parse("").is_err());
        assert!(CrawlUrl::parse("https://").is_err());
    }

    #[test]
    fn test_document_path_defaults_to_root() {
        let url = CrawlUrl::parse("https://example.com").unwrap();
        assert_eq!(url.document_path(), "/");
    }

    #[test]
    fn test_document_path_keeps_query_drops_fragment() {
        let url = CrawlUrl::parse("https://example.com/ru/about/?page=2#top").unwrap();
        assert_eq!(url.document_path(), "/ru/about/?page=2");
    }

    #[test]
    fn test_authority_includes_explicit_port() {
        let url = CrawlUrl::parse("https://example.com:8443/x").unwrap();
        assert_eq!(url.port(), Some(8443));
        assert_eq!(url.authority(), "example.com:8443");

        let url = CrawlUrl::parse("https://example.com/x").unwrap();
        assert_eq!(url.port(), None);
        assert_eq!(url.authority(), "example.com");
    }

    #[test]
    fn test_connect_host_strips_ipv6_brackets() {
        let url = CrawlUrl::parse("https://[::1]:8443/").unwrap();
        assert_eq!(url.host(), "[::1]");
        assert_eq!(url.connect_host(), "::1");
    }

    #[test]
    fn test_serializes_as_canonical_string() {
        let url = CrawlUrl::parse("https://example.com").unwrap();
        assert_eq!(serde_json::to_string(&url).unwrap(), "\"https://example.com\"");
    }
}
