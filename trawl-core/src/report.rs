// Report generation from crawl results

use trawl_scanner::{CrawlReport, CrawlStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Render `report` in the requested format.
pub fn generate_crawl_report(
    report: &CrawlReport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => serde_json::to_string_pretty(report),
    }
}

fn generate_text_report(report: &CrawlReport) -> String {
    let mut out = String::new();
    out.push_str("Result list of sites:\n");
    for result in &report.results {
        out.push_str(&result.to_string());
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&summary_line(&report.stats));
    out.push('\n');
    out
}

/// One-line digest of the run counters.
pub fn summary_line(stats: &CrawlStats) -> String {
    format!(
        "Visited {} page(s): {} link(s) discovered, {} duplicate(s), {} failed, {} rejected, {} beyond max depth",
        stats.visited,
        stats.discovered,
        stats.duplicates,
        stats.failed,
        stats.rejected,
        stats.depth_dropped
    )
}
