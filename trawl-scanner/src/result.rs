use crate::crawl_url::CrawlUrl;
use serde::Serialize;
use std::fmt;

/// A page whose fetch and scan completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    pub url: CrawlUrl,
    pub depth: usize,
}

impl CrawlResult {
    pub fn new(url: CrawlUrl, depth: usize) -> Self {
        Self { url, depth }
    }
}

impl fmt::Display for CrawlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "URL: {}, Depth: {}", self.url, self.depth)
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Pages recorded in the results.
    pub visited: usize,
    /// New URLs added to the frontier.
    pub discovered: usize,
    /// Links pointing at an already seen URL.
    pub duplicates: usize,
    /// Entries popped beyond the depth bound and never fetched.
    pub depth_dropped: usize,
    /// Resolution, connection and read failures.
    pub failed: usize,
    /// Responses whose status line was not accepted.
    pub rejected: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    pub results: Vec<CrawlResult>,
    pub stats: CrawlStats,
}
