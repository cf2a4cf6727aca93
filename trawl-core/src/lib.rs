pub mod crawl;
pub mod report;

pub use crawl::{CrawlOptions, CrawlProgressCallback, describe_event, execute_crawl, run_crawl};
pub use report::{ReportFormat, generate_crawl_report, summary_line};
