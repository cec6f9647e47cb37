use crate::TEST_USER_AGENT;
use docsync::config::CrawlerConfig;
use docsync::crawler::{FetchError, HttpFetcher};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(max_retries: u32, retry_delay_ms: u64) -> HttpFetcher {
    let config = CrawlerConfig {
        user_agent: TEST_USER_AGENT.to_string(),
        timeout_secs: 5,
        max_retries,
        retry_delay_ms,
        ..CrawlerConfig::default()
    };
    HttpFetcher::new(&config).unwrap()
}

#[tokio::test]
async fn test_retry_with_linear_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .expect(1)
        .mount(&server)
        .await;

    let start = Instant::now();
    let response = fetcher(3, 100)
        .fetch(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.body, "finally");
    assert_eq!(response.status, 200);
    // Slept 100ms after the first failure and 200ms after the second
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let result = fetcher(3, 1)
        .fetch(&format!("{}/missing", server.uri()))
        .await;

    match result {
        Err(e @ FetchError::Status { .. }) => assert_eq!(e.status(), Some(404)),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_once_does_not_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher(3, 1)
        .fetch_once(&format!("{}/sitemap.xml", server.uri()))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", TEST_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let response = fetcher(1, 1)
        .fetch(&format!("{}/page", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.body, "ok");
}
