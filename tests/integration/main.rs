//! Integration tests for docsync
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! sitemap and sync phases end-to-end against a temporary directory.

mod fetch_tests;
mod sitemap_tests;
mod sync_tests;

use docsync::config::Config;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_USER_AGENT: &str = "docsync-test/1.0";

/// Creates a test configuration writing under `dir`
pub fn test_config(dir: &Path, seeds: Vec<String>) -> Config {
    let mut config = Config::default();
    config.crawler.base_urls = seeds;
    config.crawler.user_agent = TEST_USER_AGENT.to_string();
    config.crawler.timeout_secs = 5;
    config.crawler.max_retries = 2;
    config.crawler.retry_delay_ms = 10;
    config.crawler.chunk_size = 2;
    config.crawler.max_workers = 4;
    config.output.content_dir = dir.join("content");
    config.output.urls_dir = dir.join("urls");
    config.output.state_path = dir.join("content").join(".page_state.json");
    config
}

/// Builds a `<urlset>` document listing `locs`
pub fn urlset(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("  <url><loc>{}</loc></url>\n", loc))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
        entries
    )
}

/// Serves a minimal HTML page with the given title at `route`
pub async fn mount_page(server: &MockServer, route: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    "<html><head><title>{}</title></head><body><h1>{}</h1><p>Body of {}.</p></body></html>",
                    title, title, route
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Serves an XML document at `route`
pub async fn mount_xml(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}
