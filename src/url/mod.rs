//! URL handling module for docsync
//!
//! This module provides seed URL validation, authority extraction, base path
//! derivation, sitemap parsing, and the relevance filter applied to sitemap
//! entries.

mod domain;
mod processor;
mod sitemap;

use crate::{ConfigError, ConfigResult};
use url::Url;

// Re-export main functions
pub use domain::extract_authority;
pub use processor::{default_sitemap_candidates, sitemaps_from_robots, UrlProcessor};
pub use sitemap::{is_sitemap_url, parse_sitemap_xml, SitemapError, SITEMAP_NAMESPACE};

/// Trailing path segments that name a landing page rather than a section
const LANDING_SEGMENTS: [&str; 3] = ["overview", "introduction", "docs"];

/// Derives the relevance-filter prefix for a seed URL path
///
/// Trailing slashes are removed, then one trailing landing segment
/// (`overview`, `introduction`, `docs`) is dropped if present.
///
/// # Examples
///
/// ```
/// use docsync::url::derive_base_path;
///
/// assert_eq!(derive_base_path("/en/guide"), "/en/guide");
/// assert_eq!(derive_base_path("/en/guide/overview/"), "/en/guide");
/// assert_eq!(derive_base_path("/docs"), "");
/// assert_eq!(derive_base_path("/"), "");
/// ```
pub fn derive_base_path(path: &str) -> String {
    let mut parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    if parts
        .last()
        .is_some_and(|last| LANDING_SEGMENTS.contains(last))
    {
        parts.pop();
    }
    parts.join("/")
}

/// The ordered set of seed URLs for a crawl
///
/// All seeds share one authority. Construction fails before any network
/// activity if they do not.
#[derive(Debug, Clone)]
pub struct BaseUrls {
    urls: Vec<Url>,
    authority: String,
    base_paths: Vec<String>,
}

impl BaseUrls {
    /// Parses and validates seed URLs
    ///
    /// # Errors
    ///
    /// * `ConfigError::Validation` - No seeds were given
    /// * `ConfigError::InvalidUrl` - A seed is not an absolute http(s) URL
    /// * `ConfigError::DomainMismatch` - Seeds point at different hosts
    ///
    /// # Example
    ///
    /// ```
    /// use docsync::url::BaseUrls;
    ///
    /// let seeds = BaseUrls::new(&["https://a.example.com/x", "https://b.example.com/y"]);
    /// assert!(seeds.is_err());
    /// ```
    pub fn new<S: AsRef<str>>(seeds: &[S]) -> ConfigResult<Self> {
        let mut urls = Vec::with_capacity(seeds.len());
        let mut authority: Option<String> = None;

        for seed in seeds {
            let seed = seed.as_ref().trim();
            let url = Url::parse(seed)
                .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", seed, e)))?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::InvalidUrl(format!(
                    "'{}' must use http or https",
                    seed
                )));
            }

            let seed_authority = extract_authority(&url)
                .ok_or_else(|| ConfigError::InvalidUrl(format!("'{}' has no host", seed)))?;

            match &authority {
                Some(expected) if *expected != seed_authority => {
                    return Err(ConfigError::DomainMismatch {
                        expected: expected.clone(),
                        found: seed_authority,
                    });
                }
                Some(_) => {}
                None => authority = Some(seed_authority),
            }

            urls.push(url);
        }

        let authority = authority.ok_or_else(|| {
            ConfigError::Validation("at least one base URL is required".to_string())
        })?;
        let base_paths = urls.iter().map(|u| derive_base_path(u.path())).collect();

        Ok(Self {
            urls,
            authority,
            base_paths,
        })
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// The authority every seed shares
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// One relevance prefix per seed, in seed order
    pub fn base_paths(&self) -> &[String] {
        &self.base_paths
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
