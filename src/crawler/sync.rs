//! Page sync engine
//!
//! Downloads the selected pages across a bounded worker pool, skips pages
//! whose content hash matches the previous run, writes every enabled output
//! format, and persists the updated hashes once all workers have finished.

use super::fetcher::{FetchError, HttpFetcher};
use super::pool::WorkerPool;
use super::stats::{CrawlStats, StatsSnapshot};
use crate::output::{write_output, Converter, OutputError, OutputOptions};
use crate::state::{calculate_hash, PageState, StateStore};
use crate::Result;
use std::sync::Arc;

/// What happened to one page
#[derive(Debug)]
pub enum PageOutcome {
    /// The content hash matched the previous run; nothing was written
    Unchanged,

    /// Every enabled output was written
    Written { hash: String },

    /// At least one output failed; the hash is not recorded
    Partial { failures: Vec<OutputError> },
}

/// Totals for one sync phase
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub written: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub stats: StatsSnapshot,
}

/// Syncs pages to disk with change detection
#[derive(Clone)]
pub struct PageSync {
    fetcher: Arc<HttpFetcher>,
    converter: Arc<dyn Converter>,
    stats: Arc<CrawlStats>,
    options: Arc<OutputOptions>,
    store: StateStore,
    max_workers: usize,
}

impl PageSync {
    pub fn new(
        fetcher: Arc<HttpFetcher>,
        converter: Arc<dyn Converter>,
        stats: Arc<CrawlStats>,
        options: OutputOptions,
        store: StateStore,
        max_workers: usize,
    ) -> Self {
        Self {
            fetcher,
            converter,
            stats,
            options: Arc::new(options),
            store,
            max_workers,
        }
    }

    pub fn options(&self) -> &OutputOptions {
        &self.options
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Fetches one page and writes its outputs unless it is unchanged
    ///
    /// The page is always fetched; `previous` is only consulted afterwards.
    /// Each output format is written independently, so one failing write does
    /// not prevent the others.
    pub async fn process_page(
        &self,
        url: &str,
        previous: &PageState,
    ) -> std::result::Result<PageOutcome, FetchError> {
        self.stats.set_current_url(url);
        let response = self.fetcher.fetch(url).await?;

        let hash = calculate_hash(&response.body);
        if previous.is_unchanged(url, &hash) {
            tracing::debug!("Unchanged: {}", url);
            return Ok(PageOutcome::Unchanged);
        }

        let mut failures = Vec::new();
        for kind in self.options.kinds() {
            let path = self.options.path_for(url, kind);
            let content = kind.render(&response.body, self.converter.as_ref());
            if let Err(e) = write_output(&path, &content).await {
                tracing::error!("{} ({})", e, url);
                failures.push(e);
            }
        }

        if failures.is_empty() {
            tracing::debug!("Wrote {}", url);
            Ok(PageOutcome::Written { hash })
        } else {
            Ok(PageOutcome::Partial { failures })
        }
    }

    /// Syncs every URL and saves the updated state once at the end
    ///
    /// Per-page failures are logged and counted; they never stop other
    /// pages. Only a failure to save the state is returned as an error.
    pub async fn sync(&self, urls: &[String]) -> Result<SyncReport> {
        let mut state = self.store.load();
        let previous = Arc::new(state.clone());

        tracing::info!(
            "Syncing {} pages with {} workers ({} known hashes)",
            urls.len(),
            self.max_workers,
            previous.len()
        );

        let mut pool = WorkerPool::new(self.max_workers);
        for url in urls {
            let engine = self.clone();
            let previous = Arc::clone(&previous);
            let url = url.clone();
            pool.submit(async move {
                let outcome = engine.process_page(&url, &previous).await;
                (url, outcome)
            });
        }

        let total = urls.len();
        let mut completed = 0;
        let mut written = 0;
        let mut unchanged = 0;
        let mut failed = 0;

        while let Some(joined) = pool.join_next().await {
            completed += 1;
            match joined {
                Ok((url, Ok(PageOutcome::Written { hash }))) => {
                    state.insert(url, hash);
                    self.stats.add_written();
                    written += 1;
                }
                Ok((_, Ok(PageOutcome::Unchanged))) => {
                    self.stats.add_unchanged();
                    unchanged += 1;
                }
                Ok((url, Ok(PageOutcome::Partial { failures }))) => {
                    tracing::error!("{} output(s) failed for {}", failures.len(), url);
                    self.stats.add_error();
                    failed += 1;
                }
                Ok((url, Err(e))) => {
                    tracing::error!("Failed to sync {}: {}", url, e);
                    self.stats.add_error();
                    failed += 1;
                }
                Err(e) => {
                    tracing::error!("Sync worker failed: {}", e);
                    self.stats.add_error();
                    failed += 1;
                }
            }
            tracing::info!("Synced {}/{} pages", completed, total);
        }

        self.store.save(&state)?;

        tracing::info!(
            "Sync complete: {} written, {} unchanged, {} failed",
            written,
            unchanged,
            failed
        );

        Ok(SyncReport {
            written,
            unchanged,
            failed,
            stats: self.stats.snapshot(),
        })
    }
}
