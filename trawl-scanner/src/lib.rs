pub mod connector;
pub mod crawl_url;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod frontier;
pub mod result;

#[cfg(test)]
mod testing;

pub use connector::{Connector, TcpConnector, TlsConnector};
pub use crawl_url::CrawlUrl;
pub use crawler::{CrawlEvent, Crawler, ProgressCallback};
pub use error::ScanError;
pub use extract::{extract_candidate, extract_link};
pub use fetcher::{Fetcher, ResponseLines, StatusPolicy};
pub use frontier::{Frontier, FrontierEntry, SeenSet};
pub use result::{CrawlReport, CrawlResult, CrawlStats};
