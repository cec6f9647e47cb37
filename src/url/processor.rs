//! Sitemap discovery and URL relevance classification

use crate::crawler::HttpFetcher;
use crate::url::sitemap::parse_sitemap_xml;
use crate::url::{derive_base_path, extract_authority, BaseUrls};
use crate::SyncError;
use robotstxt::{parse_robotstxt, RobotsParseHandler};
use std::sync::Arc;
use url::Url;

/// Collects `Sitemap:` directives while robots.txt is parsed
#[derive(Default)]
struct SitemapDirectives {
    sitemaps: Vec<String>,
}

impl RobotsParseHandler for SitemapDirectives {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.sitemaps.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}

/// Extracts sitemap locations advertised in a robots.txt body
///
/// # Example
///
/// ```
/// use docsync::url::sitemaps_from_robots;
///
/// let body = "User-agent: *\nDisallow: /private\nSitemap: https://example.com/sitemap.xml\n";
/// assert_eq!(sitemaps_from_robots(body), vec!["https://example.com/sitemap.xml"]);
/// ```
pub fn sitemaps_from_robots(body: &str) -> Vec<String> {
    let mut directives = SitemapDirectives::default();
    parse_robotstxt(body, &mut directives);
    directives.sitemaps
}

/// Well-known sitemap locations for a base URL, in probe order
///
/// # Example
///
/// ```
/// use docsync::url::default_sitemap_candidates;
/// use url::Url;
///
/// let base = Url::parse("https://docs.example.com/en/guide").unwrap();
/// assert_eq!(
///     default_sitemap_candidates(&base),
///     vec![
///         "https://docs.example.com/sitemap.xml",
///         "https://docs.example.com/sitemap_index.xml",
///         "https://docs.example.com/en/guide/sitemap.xml",
///     ]
/// );
/// ```
pub fn default_sitemap_candidates(base_url: &Url) -> Vec<String> {
    let mut candidates = Vec::new();

    for name in ["/sitemap.xml", "/sitemap_index.xml"] {
        if let Ok(url) = base_url.join(name) {
            candidates.push(url.to_string());
        }
    }

    let base_path = derive_base_path(base_url.path());
    if !base_path.is_empty() {
        if let Ok(url) = base_url.join(&format!("{}/sitemap.xml", base_path)) {
            candidates.push(url.to_string());
        }
    }

    candidates
}

/// Returns true if some path segment equals the language code
fn path_has_language(path: &str, language: &str) -> bool {
    path.split('/')
        .any(|segment| segment.eq_ignore_ascii_case(language))
}

/// Discovers and parses sitemaps, and decides which URLs belong to the crawl
pub struct UrlProcessor {
    base_urls: BaseUrls,
    fetcher: Arc<HttpFetcher>,
}

impl UrlProcessor {
    pub fn new(base_urls: BaseUrls, fetcher: Arc<HttpFetcher>) -> Self {
        Self { base_urls, fetcher }
    }

    pub fn base_urls(&self) -> &BaseUrls {
        &self.base_urls
    }

    /// Probes well-known locations for a sitemap and returns the first that answers
    ///
    /// Candidates advertised in `/robots.txt` are tried before the defaults
    /// from [`default_sitemap_candidates`]. Each probe is a single request
    /// without retry.
    pub async fn find_sitemap_url(&self, base_url: &Url) -> Option<String> {
        let mut candidates = Vec::new();

        if let Ok(robots_url) = base_url.join("/robots.txt") {
            match self.fetcher.fetch_once(robots_url.as_str()).await {
                Ok(response) => {
                    for sitemap in sitemaps_from_robots(&response.body) {
                        if let Ok(url) = base_url.join(&sitemap) {
                            candidates.push(url.to_string());
                        }
                    }
                }
                Err(e) => tracing::debug!("No robots.txt for {}: {}", base_url, e),
            }
        }

        for candidate in default_sitemap_candidates(base_url) {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        for candidate in candidates {
            tracing::debug!("Probing sitemap candidate {}", candidate);
            match self.fetcher.fetch_once(&candidate).await {
                Ok(_) => {
                    tracing::info!("Found sitemap: {}", candidate);
                    return Some(candidate);
                }
                Err(e) => tracing::debug!("Sitemap candidate rejected: {}", e),
            }
        }

        None
    }

    /// Fetches a sitemap document and returns all of its `<loc>` entries
    ///
    /// Entries that are themselves sitemaps are returned unchanged for the
    /// caller to expand.
    pub async fn parse_sitemap(&self, sitemap_url: &str) -> Result<Vec<String>, SyncError> {
        let response = self.fetcher.fetch(sitemap_url).await?;
        let locs = parse_sitemap_xml(response.body.as_bytes())?;
        tracing::debug!("Sitemap {} lists {} entries", sitemap_url, locs.len());
        Ok(locs)
    }

    /// Checks whether a URL belongs to the crawl
    ///
    /// A URL is relevant when all of the following hold:
    /// - its authority equals the seeds' authority
    /// - its path starts with one of the base paths
    /// - `language` is `None`, or one of its path segments equals the code
    ///   (ASCII case-insensitive)
    pub fn is_relevant_url(&self, url: &str, language: Option<&str>) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        if extract_authority(&parsed).as_deref() != Some(self.base_urls.authority()) {
            return false;
        }

        let path = parsed.path();
        if !self
            .base_urls
            .base_paths()
            .iter()
            .any(|base| path.starts_with(base.as_str()))
        {
            return false;
        }

        match language {
            Some(code) => path_has_language(path, code),
            None => true,
        }
    }
}
