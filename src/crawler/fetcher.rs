//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Treating any non-2xx response as a failure
//! - Retrying failed requests with linear backoff

use crate::config::CrawlerConfig;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::time::Duration;
use thiserror::Error;

/// Upper bound on the connection phase of a request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised by a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Body { url, .. } => url,
        }
    }

    /// The HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A successful HTTP response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded response body
    pub body: String,
}

/// Builds an HTTP client with the configured user agent and per-request timeout
///
/// # Example
///
/// ```no_run
/// use docsync::config::CrawlerConfig;
/// use docsync::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.timeout();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Delay before the attempt following failed attempt number `attempt` (1-based)
pub fn backoff_delay(retry_delay: Duration, attempt: u32) -> Duration {
    retry_delay * attempt
}

/// HTTP client wrapper with bounded retry
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Return the response |
/// | 4xx / 5xx | Retry |
/// | Transport error or timeout | Retry |
///
/// At most `max_retries` attempts are made in total. After failed attempt
/// `n`, the fetcher sleeps `retry_delay * n` before trying again. The last
/// error is returned once attempts run out.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(
            client,
            config.max_retries,
            config.retry_delay(),
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    /// Sends a GET request, retrying on failure
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.request(Method::GET, url).await
    }

    /// Sends a single GET request without retrying
    pub async fn fetch_once(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.attempt(Method::GET, url).await
    }

    /// Sends a request with the given method, retrying on failure
    pub async fn request(&self, method: Method, url: &str) -> Result<FetchResponse, FetchError> {
        let mut attempt = 1;
        loop {
            match self.attempt(method.clone(), url).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    let delay = backoff_delay(self.retry_delay, attempt);
                    tracing::warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt,
                        self.max_retries,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, method: Method, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchResponse {
            url: final_url,
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
