use crate::crawl_url::CrawlUrl;
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be visited, with its hop count from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: CrawlUrl,
    pub depth: usize,
}

impl FrontierEntry {
    pub fn new(url: CrawlUrl, depth: usize) -> Self {
        Self { url, depth }
    }
}

/// FIFO of entries still to visit.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Every URL ever enqueued during one run.
#[derive(Debug, Default)]
pub struct SeenSet {
    urls: HashSet<CrawlUrl>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as seen. Returns `true` only the first time, so the
    /// caller enqueues exactly when this says so.
    pub fn insert(&mut self, url: &CrawlUrl) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.clone())
    }

    pub fn contains(&self, url: &CrawlUrl) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
