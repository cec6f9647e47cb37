//! Shared crawl counters
//!
//! Workers update the counters concurrently; reporting reads them through
//! [`CrawlStats::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Running totals for a crawl, safe to update from any worker
#[derive(Debug, Default)]
pub struct CrawlStats {
    processed: AtomicU64,
    relevant: AtomicU64,
    errors: AtomicU64,
    unchanged: AtomicU64,
    written: AtomicU64,
    current_url: Mutex<Option<String>>,
}

/// A point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Sitemap entries examined
    pub processed: u64,
    /// Sitemap entries that passed the relevance filter
    pub relevant: u64,
    /// Units that failed
    pub errors: u64,
    /// Pages skipped because their content hash was unchanged
    pub unchanged: u64,
    /// Pages whose outputs were written
    pub written: u64,
    /// The URL most recently picked up by a worker
    pub current_url: Option<String>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processed(&self, count: u64) {
        self.processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_relevant(&self, count: u64) {
        self.relevant.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_unchanged(&self) {
        self.unchanged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_current_url(&self, url: &str) {
        let mut current = self
            .current_url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some(url.to_string());
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        let current_url = self
            .current_url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            relevant: self.relevant.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            current_url,
        }
    }
}
