use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for docsync
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Seed URLs; all must share one host
    pub base_urls: Vec<String>,

    /// Language code the page path must carry (e.g. "en", "pt-BR")
    pub language: Option<String>,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-attempt request timeout (seconds)
    pub timeout_secs: u64,

    /// Total attempts per request, including the first
    pub max_retries: u32,

    /// Base delay for linear backoff between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Number of sitemap entries handed to one worker
    pub chunk_size: usize,

    /// Size of the worker pool for both sitemap and page phases
    pub max_workers: usize,

    /// Report detailed statistics while running
    pub debug: bool,
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_urls: Vec::new(),
            language: None,
            user_agent: format!(
                "docsync/{} (+https://github.com/docsync/docsync)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
            chunk_size: 10,
            max_workers: 5,
            debug: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory for downloaded page content
    pub content_dir: PathBuf,

    /// Root directory for the selected URL lists
    pub urls_dir: PathBuf,

    /// Location of the persisted URL -> content hash map
    pub state_path: PathBuf,

    /// Write Markdown converted from the page
    pub markdown: bool,

    /// Write the raw HTML body
    pub html: bool,

    /// Write the page's plain text
    pub text: bool,

    /// Collapse URL paths into single file names
    pub flatten: bool,

    /// Write the list of selected URLs
    pub store_urls: bool,
}

impl OutputConfig {
    /// Returns true if at least one content format is enabled
    pub fn any_format(&self) -> bool {
        self.markdown || self.html || self.text
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("downloaded_urls"),
            urls_dir: PathBuf::from("selected_urls"),
            state_path: PathBuf::from("downloaded_urls/.page_state.json"),
            markdown: true,
            html: false,
            text: false,
            flatten: false,
            store_urls: true,
        }
    }
}
