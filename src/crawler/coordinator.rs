//! Crawler coordinator - wires one run together
//!
//! The coordinator owns the validated configuration and the components
//! shared by both phases of a run:
//! - Sitemap discovery and filtering ([`SitemapBuilder`])
//! - Storing the selected URL list
//! - Syncing pages to disk ([`PageSync`])

use super::fetcher::HttpFetcher;
use super::sitemap_builder::{Sitemap, SitemapBuilder};
use super::stats::CrawlStats;
use super::sync::{PageSync, SyncReport};
use crate::config::{validate, Config};
use crate::output::{store_urls, Converter, HtmlConverter, OutputOptions};
use crate::state::StateStore;
use crate::url::{BaseUrls, UrlProcessor};
use crate::{ConfigError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    base_urls: Option<BaseUrls>,
    fetcher: Arc<HttpFetcher>,
    converter: Arc<dyn Converter>,
    stats: Arc<CrawlStats>,
}

impl Coordinator {
    /// Creates a coordinator for one run
    ///
    /// Validates the configuration and the seed URLs. No request is sent, so
    /// seeds on different hosts fail here with `ConfigError::DomainMismatch`.
    /// A configuration without seeds can still sync an explicit URL list.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SyncError)` - Invalid configuration or HTTP client setup failed
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;

        let base_urls = if config.crawler.base_urls.is_empty() {
            None
        } else {
            Some(BaseUrls::new(&config.crawler.base_urls)?)
        };

        let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);

        Ok(Self {
            config: Arc::new(config),
            base_urls,
            fetcher,
            converter: Arc::new(HtmlConverter::new()),
            stats: Arc::new(CrawlStats::new()),
        })
    }

    /// Replaces the HTML converter
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_urls(&self) -> Option<&BaseUrls> {
        self.base_urls.as_ref()
    }

    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Creates the sitemap phase for the configured seeds
    pub fn sitemap_builder(&self) -> Result<SitemapBuilder> {
        let base_urls = self.base_urls.clone().ok_or_else(|| {
            ConfigError::Validation("at least one base URL is required".to_string())
        })?;

        let processor = Arc::new(UrlProcessor::new(base_urls, Arc::clone(&self.fetcher)));
        Ok(SitemapBuilder::new(
            processor,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.converter),
            Arc::clone(&self.stats),
            &self.config.crawler,
        ))
    }

    /// Discovers and filters the site's pages
    pub async fn build_sitemap(&self) -> Result<Sitemap> {
        self.sitemap_builder()?.build().await
    }

    /// Writes the selected URL list, unless disabled
    ///
    /// Returns the file written.
    pub fn store_urls(&self, urls: &[String]) -> Result<Option<PathBuf>> {
        if !self.config.output.store_urls {
            return Ok(None);
        }
        Ok(Some(store_urls(urls, &self.config.output.urls_dir)?))
    }

    /// Creates the page sync phase
    pub fn page_sync(&self) -> PageSync {
        PageSync::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.converter),
            Arc::clone(&self.stats),
            OutputOptions::from_config(&self.config.output),
            StateStore::new(&self.config.output.state_path),
            self.config.crawler.max_workers,
        )
    }

    /// Syncs the given pages to disk
    pub async fn sync_pages(&self, urls: &[String]) -> Result<SyncReport> {
        self.page_sync().sync(urls).await
    }
}
