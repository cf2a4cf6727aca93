use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use trawl_scanner::crawler::DEFAULT_MAX_DEPTH;
use trawl_scanner::fetcher::DEFAULT_TIMEOUT;
use trawl_scanner::{
    Connector, CrawlEvent, CrawlReport, CrawlUrl, Crawler, ProgressCallback, ScanError,
    StatusPolicy,
};

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seed: String,
    pub max_depth: usize,
    pub timeout: Duration,
    pub status_policy: StatusPolicy,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: DEFAULT_TIMEOUT,
            status_policy: StatusPolicy::default(),
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = ProgressCallback;

/// Human-readable progress line for an event, if it warrants one.
pub fn describe_event(event: &CrawlEvent) -> Option<String> {
    match event {
        CrawlEvent::Connecting { url, .. } => Some(format!("Connecting to {}", url)),
        CrawlEvent::Connected { .. } => Some("Connected successfully!".to_string()),
        CrawlEvent::Rejected { status_line, .. } if status_line.is_empty() => {
            Some("Server returned an empty response".to_string())
        }
        CrawlEvent::Rejected { status_line, .. } => {
            Some(format!("Server returned error: {}", status_line))
        }
        CrawlEvent::Failed { error, .. } => Some(error.to_string()),
        CrawlEvent::Discovered { .. }
        | CrawlEvent::Visited { .. }
        | CrawlEvent::DepthExceeded { .. } => None,
    }
}

/// Execute a crawl over TLS with the given options.
///
/// Fails before crawling if the seed is malformed or TLS cannot be set up.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport, ScanError> {
    // Validate the seed before anything touches the network stack.
    let seed = CrawlUrl::parse(&options.seed)?;
    let crawler = Crawler::new()?;
    Ok(run_crawl(crawler, &seed, &options, progress_callback).await)
}

/// Run `crawler` from `seed`, applying `options` and driving the spinner.
pub async fn run_crawl<C: Connector>(
    crawler: Crawler<C>,
    seed: &CrawlUrl,
    options: &CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> CrawlReport {
    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let visited_count = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let count_clone = visited_count.clone();
    let internal_callback: ProgressCallback = Arc::new(move |event: &CrawlEvent| {
        if let Some(ref pb) = pb_clone {
            match event {
                CrawlEvent::Connecting { url, depth } => {
                    pb.set_message(format!("[depth {}] {}", depth, url));
                }
                CrawlEvent::Visited { .. } => {
                    let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
                    pb.set_message(format!("Crawling... {} pages visited", count));
                }
                _ => {}
            }
        }

        if let Some(ref callback) = progress_callback {
            // Keep printed lines from tearing the spinner.
            match pb_clone {
                Some(ref pb) => pb.suspend(|| callback(event)),
                None => callback(event),
            }
        }
    });

    let crawler = crawler
        .with_max_depth(options.max_depth)
        .with_timeout(options.timeout)
        .with_status_policy(options.status_policy)
        .with_progress_callback(internal_callback);

    let report = crawler.crawl_url(seed).await;
    info!(
        "Crawl of {} finished with {} results",
        seed,
        report.results.len()
    );

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    report
}
