//! Sitemap processing
//!
//! Turns the sitemap(s) of the seed URLs into a URL to title mapping. Sitemap
//! entries are split into chunks, and each chunk is processed by one worker
//! of a bounded pool. Nested sitemaps are expanded inside the worker that
//! meets them.

use super::fetcher::HttpFetcher;
use super::parser::extract_title;
use super::pool::WorkerPool;
use super::stats::CrawlStats;
use crate::config::CrawlerConfig;
use crate::output::Converter;
use crate::url::{is_sitemap_url, UrlProcessor};
use crate::{Result, SyncError};
use std::collections::{btree_map, BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::task::Id;

/// Sitemap nesting levels followed below the top-level sitemap, inclusive
pub const MAX_SITEMAP_DEPTH: usize = 4;

/// Relevant pages of a site, keyed by URL, with their titles
///
/// Iteration is sorted by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sitemap {
    entries: BTreeMap<String, String>,
}

impl Sitemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a page, returning the previous title
    pub fn insert(&mut self, url: impl Into<String>, title: impl Into<String>) -> Option<String> {
        self.entries.insert(url.into(), title.into())
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(url, title)` pairs in URL order
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// All URLs in order
    pub fn urls(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl FromIterator<(String, String)> for Sitemap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, String)> for Sitemap {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// Builds a [`Sitemap`] for the seed URLs of a [`UrlProcessor`]
#[derive(Clone)]
pub struct SitemapBuilder {
    processor: Arc<UrlProcessor>,
    fetcher: Arc<HttpFetcher>,
    converter: Arc<dyn Converter>,
    stats: Arc<CrawlStats>,
    language: Option<String>,
    chunk_size: usize,
    max_workers: usize,
    debug: bool,
    sitemap: Arc<Mutex<Sitemap>>,
}

impl SitemapBuilder {
    pub fn new(
        processor: Arc<UrlProcessor>,
        fetcher: Arc<HttpFetcher>,
        converter: Arc<dyn Converter>,
        stats: Arc<CrawlStats>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            processor,
            fetcher,
            converter,
            stats,
            language: config.language.clone(),
            chunk_size: config.chunk_size.max(1),
            max_workers: config.max_workers,
            debug: config.debug,
            sitemap: Arc::new(Mutex::new(Sitemap::new())),
        }
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Discovers, expands and filters the seeds' sitemaps
    ///
    /// # Errors
    ///
    /// * `SyncError::NoSitemap` - no seed has a reachable sitemap
    /// * `SyncError::NoPages` - sitemaps were found but no relevant page was
    pub async fn build(&self) -> Result<Sitemap> {
        let sitemap_urls = self.collect_sitemap_urls().await?;

        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        for sitemap_url in &sitemap_urls {
            match self.processor.parse_sitemap(sitemap_url).await {
                Ok(locs) => {
                    for loc in locs {
                        if seen.insert(loc.clone()) {
                            entries.push(loc);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to read sitemap {}: {}", sitemap_url, e);
                    self.stats.add_error();
                }
            }
        }

        tracing::info!(
            "Processing {} sitemap entries in chunks of {} with {} workers",
            entries.len(),
            self.chunk_size,
            self.max_workers
        );

        let sitemap = self.process_all(&entries).await;
        let totals = self.stats.snapshot();
        tracing::info!(
            "Sitemap complete: {} pages ({} processed, {} relevant, {} errors)",
            sitemap.len(),
            totals.processed,
            totals.relevant,
            totals.errors
        );

        if sitemap.is_empty() {
            return Err(SyncError::NoPages);
        }
        Ok(sitemap)
    }

    /// Finds one sitemap per seed, without duplicates
    pub async fn collect_sitemap_urls(&self) -> Result<Vec<String>> {
        let mut found: Vec<String> = Vec::new();

        for base_url in self.processor.base_urls().urls() {
            match self.processor.find_sitemap_url(base_url).await {
                Some(url) if !found.contains(&url) => found.push(url),
                Some(_) => {}
                None => tracing::warn!("No sitemap found for {}", base_url),
            }
        }

        if found.is_empty() {
            let base_url = self
                .processor
                .base_urls()
                .urls()
                .first()
                .map(|u| u.to_string())
                .unwrap_or_default();
            return Err(SyncError::NoSitemap { base_url });
        }
        Ok(found)
    }

    /// Processes sitemap entries across the worker pool and returns the merged result
    ///
    /// Chunks are merged as they complete. A chunk whose worker panics is
    /// counted as one error and as finished; all other chunks still
    /// contribute.
    pub async fn process_all(&self, urls: &[String]) -> Sitemap {
        let mut pool = WorkerPool::new(self.max_workers);
        let mut progress = ChunkProgress::new(urls.len());
        for chunk in urls.chunks(self.chunk_size) {
            let builder = self.clone();
            let len = chunk.len();
            let chunk = chunk.to_vec();
            let id = pool.submit(async move { builder.process_chunk(chunk).await });
            progress.track(id, len);
        }

        while let Some(joined) = pool.join_next_with_id().await {
            let id = match joined {
                Ok((id, (_, entries))) => {
                    self.merge(entries);
                    id
                }
                Err(e) => {
                    tracing::error!("Sitemap worker failed: {}", e);
                    self.stats.add_error();
                    e.id()
                }
            };
            let done = progress.finish(id);
            tracing::info!("Processed {}/{} sitemap entries", done, progress.total());
            if self.debug {
                let snapshot = self.stats.snapshot();
                tracing::info!(
                    "Totals: {} processed, {} relevant, {} errors",
                    snapshot.processed,
                    snapshot.relevant,
                    snapshot.errors
                );
            }
        }

        self.sitemap()
    }

    /// Processes one chunk sequentially, returning its size and its pages
    pub async fn process_chunk(&self, urls: Vec<String>) -> (usize, Vec<(String, String)>) {
        let mut entries = Vec::new();
        for url in &urls {
            entries.extend(self.process_sitemap_url(url).await);
        }
        (urls.len(), entries)
    }

    /// Resolves one sitemap entry to the relevant pages it stands for
    ///
    /// A nested sitemap expands to the relevant pages it lists. A page URL
    /// yields itself if relevant. Failures are logged and yield nothing.
    pub async fn process_sitemap_url(&self, url: &str) -> Vec<(String, String)> {
        if is_sitemap_url(url) {
            return self.expand_sitemap(url).await;
        }

        self.stats.add_processed(1);
        self.stats.set_current_url(url);

        if !self.is_relevant(url) {
            tracing::debug!("Skipping irrelevant URL {}", url);
            return Vec::new();
        }

        self.stats.add_relevant(1);
        let title = self.get_page_title(url).await;
        vec![(url.to_string(), title)]
    }

    async fn expand_sitemap(&self, root: &str) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![(root.to_string(), 0usize)];

        while let Some((sitemap_url, depth)) = pending.pop() {
            if !visited.insert(sitemap_url.clone()) {
                continue;
            }

            let locs = match self.processor.parse_sitemap(&sitemap_url).await {
                Ok(locs) => locs,
                Err(e) => {
                    tracing::error!("Failed to process sitemap {}: {}", sitemap_url, e);
                    self.stats.add_error();
                    continue;
                }
            };

            let mut nested = Vec::new();
            for loc in locs {
                self.stats.add_processed(1);
                self.stats.set_current_url(&loc);

                if is_sitemap_url(&loc) {
                    if depth < MAX_SITEMAP_DEPTH {
                        nested.push((loc, depth + 1));
                    } else {
                        tracing::warn!("Not following {}: sitemap nesting too deep", loc);
                    }
                } else if self.is_relevant(&loc) {
                    self.stats.add_relevant(1);
                    let title = self.get_page_title(&loc).await;
                    entries.push((loc, title));
                } else {
                    tracing::debug!("Skipping irrelevant URL {}", loc);
                }
            }

            // Visit nested sitemaps in document order
            pending.extend(nested.into_iter().rev());
        }

        entries
    }

    /// Fetches a page and returns its cleaned title
    ///
    /// Falls back to the URL itself when the page has no title or cannot be
    /// fetched.
    pub async fn get_page_title(&self, url: &str) -> String {
        match self.fetcher.fetch(url).await {
            Ok(response) => {
                let raw = extract_title(&response.body).unwrap_or_else(|| url.to_string());
                self.converter.clean_title(&raw, url)
            }
            Err(e) => {
                tracing::warn!("Could not fetch title for {}: {}", url, e);
                url.to_string()
            }
        }
    }

    /// The pages merged so far
    pub fn sitemap(&self) -> Sitemap {
        self.sitemap
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn is_relevant(&self, url: &str) -> bool {
        self.processor.is_relevant_url(url, self.language.as_deref())
    }

    fn merge(&self, entries: Vec<(String, String)>) {
        let mut sitemap = self
            .sitemap
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sitemap.extend(entries);
    }
}

/// Entries finished so far, keyed by the task handling each chunk
#[derive(Debug)]
struct ChunkProgress {
    total: usize,
    done: usize,
    pending: HashMap<Id, usize>,
}

impl ChunkProgress {
    fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            pending: HashMap::new(),
        }
    }

    fn track(&mut self, id: Id, len: usize) {
        self.pending.insert(id, len);
    }

    /// Marks a chunk finished, successful or not, and returns the running count
    fn finish(&mut self, id: Id) -> usize {
        self.done += self.pending.remove(&id).unwrap_or(0);
        self.done
    }

    fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::HtmlConverter;
    use crate::url::BaseUrls;

    fn builder(seed: &str, language: Option<&str>) -> SitemapBuilder {
        let config = CrawlerConfig {
            language: language.map(str::to_string),
            ..CrawlerConfig::default()
        };
        let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
        let processor = Arc::new(UrlProcessor::new(
            BaseUrls::new(&[seed]).unwrap(),
            Arc::clone(&fetcher),
        ));
        SitemapBuilder::new(
            processor,
            fetcher,
            Arc::new(HtmlConverter::new()),
            Arc::new(CrawlStats::new()),
            &config,
        )
    }

    #[tokio::test]
    async fn test_panicked_chunk_still_counts_as_finished() {
        let mut pool: WorkerPool<()> = WorkerPool::new(2);
        let mut progress = ChunkProgress::new(5);
        progress.track(pool.submit(async {}), 2);
        progress.track(pool.submit(async { panic!("chunk failed") }), 2);
        progress.track(pool.submit(async {}), 1);

        let mut done = 0;
        while let Some(joined) = pool.join_next_with_id().await {
            let id = match joined {
                Ok((id, ())) => id,
                Err(e) => e.id(),
            };
            done = progress.finish(id);
        }

        assert_eq!(done, 5);
        assert_eq!(done, progress.total());
    }

    #[test]
    fn test_sitemap_is_sorted() {
        let sitemap: Sitemap = [
            ("https://a/z".to_string(), "Z".to_string()),
            ("https://a/b".to_string(), "B".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(sitemap.urls(), vec!["https://a/b", "https://a/z"]);
        assert_eq!(sitemap.get("https://a/z"), Some("Z"));
        assert!(sitemap.contains("https://a/b"));
        assert_eq!(sitemap.len(), 2);
    }

    #[tokio::test]
    async fn test_irrelevant_url_is_counted_not_fetched() {
        let builder = builder("https://docs.example.com/en/guide", Some("en"));

        let result = builder
            .process_sitemap_url("https://other.example.com/en/guide/a")
            .await;

        assert!(result.is_empty());
        let stats = builder.stats().snapshot();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.relevant, 0);
    }

    #[tokio::test]
    async fn test_merge_accumulates() {
        let builder = builder("https://docs.example.com/en/guide", None);
        builder.merge(vec![("https://docs.example.com/en/guide/a".into(), "A".into())]);
        builder.merge(vec![("https://docs.example.com/en/guide/b".into(), "B".into())]);

        assert_eq!(builder.sitemap().len(), 2);
    }

    #[tokio::test]
    async fn test_process_all_empty_input() {
        let builder = builder("https://docs.example.com/en/guide", None);
        assert!(builder.process_all(&[]).await.is_empty());
    }
}
