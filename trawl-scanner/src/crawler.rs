use crate::connector::{Connector, TlsConnector};
use crate::crawl_url::CrawlUrl;
use crate::error::{Result, ScanError};
use crate::extract::extract_link;
use crate::fetcher::{Fetcher, StatusPolicy};
use crate::frontier::{Frontier, FrontierEntry, SeenSet};
use crate::result::{CrawlReport, CrawlResult, CrawlStats};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_DEPTH: usize = 1;

pub type ProgressCallback = Arc<dyn Fn(&CrawlEvent) + Send + Sync>;

/// What the engine is doing, reported as it happens.
#[derive(Debug)]
pub enum CrawlEvent {
    Connecting { url: CrawlUrl, depth: usize },
    Connected { url: CrawlUrl },
    Rejected { url: CrawlUrl, status_line: String },
    Failed { url: CrawlUrl, error: ScanError },
    Discovered { url: CrawlUrl, depth: usize },
    Visited { url: CrawlUrl, depth: usize },
    DepthExceeded { url: CrawlUrl, depth: usize },
}

/// State of a single run. Nothing outlives the `crawl` call that built it.
struct CrawlState {
    frontier: Frontier,
    seen: SeenSet,
    results: Vec<CrawlResult>,
    stats: CrawlStats,
}

impl CrawlState {
    fn new(seed: CrawlUrl) -> Self {
        let mut seen = SeenSet::new();
        seen.insert(&seed);
        let mut frontier = Frontier::new();
        frontier.push(FrontierEntry::new(seed, 0));

        Self {
            frontier,
            seen,
            results: Vec::new(),
            stats: CrawlStats::default(),
        }
    }

    fn into_report(self) -> CrawlReport {
        CrawlReport {
            results: self.results,
            stats: self.stats,
        }
    }
}

/// Breadth-first, depth-bounded, strictly sequential crawler.
pub struct Crawler<C> {
    fetcher: Fetcher<C>,
    max_depth: usize,
    status_policy: StatusPolicy,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler<TlsConnector> {
    /// A crawler that speaks TLS to port 443 (or the URL's explicit port).
    pub fn new() -> Result<Self> {
        Ok(Self::with_connector(TlsConnector::new()?))
    }
}

impl<C: Connector> Crawler<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            fetcher: Fetcher::new(connector),
            max_depth: DEFAULT_MAX_DEPTH,
            status_policy: StatusPolicy::default(),
            progress_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetcher = self.fetcher.with_timeout(timeout);
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawls from `seed`. Fails only when the seed is not a valid URL.
    pub async fn crawl(&self, seed: &str) -> Result<CrawlReport> {
        let seed = CrawlUrl::parse(seed)?;
        Ok(self.crawl_url(&seed).await)
    }

    pub async fn crawl_url(&self, seed: &CrawlUrl) -> CrawlReport {
        info!("Starting crawl of {} (max depth {})", seed, self.max_depth);
        let mut state = CrawlState::new(seed.clone());

        while let Some(entry) = state.frontier.pop() {
            if entry.depth > self.max_depth {
                debug!("Dropping {} at depth {}", entry.url, entry.depth);
                state.stats.depth_dropped += 1;
                self.report(&CrawlEvent::DepthExceeded {
                    url: entry.url,
                    depth: entry.depth,
                });
                continue;
            }

            self.visit(entry, &mut state).await;
        }

        info!(
            "Crawl complete. Visited {} pages, {} failed, {} rejected",
            state.stats.visited, state.stats.failed, state.stats.rejected
        );
        state.into_report()
    }

    async fn visit(&self, entry: FrontierEntry, state: &mut CrawlState) {
        self.report(&CrawlEvent::Connecting {
            url: entry.url.clone(),
            depth: entry.depth,
        });

        match self.scan_page(&entry, state).await {
            Ok(()) => {
                state.stats.visited += 1;
                self.report(&CrawlEvent::Visited {
                    url: entry.url.clone(),
                    depth: entry.depth,
                });
                state.results.push(CrawlResult::new(entry.url, entry.depth));
            }
            Err(ScanError::NonSuccessStatus { status_line, .. }) => {
                debug!("{} answered {:?}", entry.url, status_line);
                state.stats.rejected += 1;
                self.report(&CrawlEvent::Rejected {
                    url: entry.url,
                    status_line,
                });
            }
            Err(error) => {
                warn!("Crawl error for {}: {}", entry.url, error);
                state.stats.failed += 1;
                self.report(&CrawlEvent::Failed {
                    url: entry.url,
                    error,
                });
            }
        }
    }

    /// Fetches one page and enqueues every new link on it. Links found before
    /// a mid-stream failure stay enqueued.
    async fn scan_page(&self, entry: &FrontierEntry, state: &mut CrawlState) -> Result<()> {
        let mut lines = self.fetcher.fetch(&entry.url).await?;

        let status_line = lines.next_line().await?.unwrap_or_default();
        if !self.status_policy.accepts(&status_line) {
            return Err(ScanError::NonSuccessStatus {
                url: entry.url.to_string(),
                status_line,
            });
        }
        self.report(&CrawlEvent::Connected {
            url: entry.url.clone(),
        });

        let next_depth = entry.depth + 1;
        while let Some(line) = lines.next_line().await? {
            let Some(link) = extract_link(&line) else {
                continue;
            };

            if state.seen.insert(&link) {
                debug!("Queuing {} at depth {}", link, next_depth);
                state.stats.discovered += 1;
                self.report(&CrawlEvent::Discovered {
                    url: link.clone(),
                    depth: next_depth,
                });
                state.frontier.push(FrontierEntry::new(link, next_depth));
            } else {
                state.stats.duplicates += 1;
            }
        }

        Ok(())
    }

    fn report(&self, event: &CrawlEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}
