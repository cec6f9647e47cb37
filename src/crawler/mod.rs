//! Crawler module for sitemap processing and page syncing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Page title extraction
//! - The bounded worker pool shared by both phases
//! - Sitemap processing and page syncing
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod parser;
mod pool;
mod sitemap_builder;
mod stats;
mod sync;

pub use coordinator::Coordinator;
pub use fetcher::{backoff_delay, build_http_client, FetchError, FetchResponse, HttpFetcher};
pub use parser::extract_title;
pub use pool::WorkerPool;
pub use sitemap_builder::{Sitemap, SitemapBuilder, MAX_SITEMAP_DEPTH};
pub use stats::{CrawlStats, StatsSnapshot};
pub use sync::{PageOutcome, PageSync, SyncReport};

use crate::config::Config;
use crate::select::{choose_pages, PageSelector};
use crate::Result;

/// Runs a complete crawl and sync
///
/// This is the main library entry point. It will:
/// 1. Validate the configuration and seed URLs
/// 2. Discover and filter the site's pages through its sitemap
/// 3. Let `selector` choose which pages to sync
/// 4. Store the selected URL list (if enabled)
/// 5. Sync the selected pages to disk
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `selector` - Chooses pages from the discovered sitemap
///
/// # Returns
///
/// * `Ok(SyncReport)` - The run completed, possibly with per-page failures
/// * `Err(SyncError)` - A fatal error stopped the run
pub async fn crawl(config: Config, selector: &mut dyn PageSelector) -> Result<SyncReport> {
    let coordinator = Coordinator::new(config)?;
    let sitemap = coordinator.build_sitemap().await?;
    let selected = choose_pages(&sitemap, selector)?;
    coordinator.store_urls(&selected)?;
    coordinator.sync_pages(&selected).await
}
