//! docsync: a documentation site archiver
//!
//! This crate discovers a documentation site's pages through its sitemap,
//! filters them by base path and language, and syncs the selected pages to
//! disk as Markdown, HTML or plain text, skipping pages whose content has not
//! changed since the previous run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod select;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for docsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] crate::url::SitemapError),

    #[error("State error: {0}")]
    State(#[from] state::StateError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("No sitemap found for {base_url}")]
    NoSitemap { base_url: String },

    #[error("No relevant pages found")]
    NoPages,

    #[error("No pages selected")]
    NothingSelected,

    #[error("Invalid URL in list: {line}")]
    InvalidUrlList { line: String },

    #[error("Page selection failed: {0}")]
    Selection(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Seed URLs must share one domain: expected {expected}, found {found}")]
    DomainMismatch { expected: String, found: String },
}

/// Result type alias for docsync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlStats, HttpFetcher, PageSync, Sitemap, SitemapBuilder};
pub use state::{calculate_hash, PageState, StateStore};
pub use crate::url::{BaseUrls, UrlProcessor};
