use crate::{mount_page, mount_xml, test_config, urlset};
use docsync::crawler::Coordinator;
use docsync::{ConfigError, SyncError};
use tempfile::TempDir;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_sitemap_filters_and_expands_nested() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        urlset(&[
            format!("{}/en/guide/intro", base),
            format!("{}/fr/guide/intro", base),
            format!("{}/sitemap-2.xml", base),
        ]),
    )
    .await;
    mount_xml(
        &server,
        "/sitemap-2.xml",
        urlset(&[format!("{}/en/guide/advanced", base)]),
    )
    .await;
    mount_page(&server, "/en/guide/intro", "Intro | Example Docs").await;
    mount_page(&server, "/en/guide/advanced", "Advanced").await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), vec![format!("{}/en/guide", base)]);
    config.crawler.language = Some("en".to_string());

    let coordinator = Coordinator::new(config).unwrap();
    let sitemap = coordinator.build_sitemap().await.unwrap();

    assert_eq!(sitemap.len(), 2);
    assert_eq!(sitemap.get(&format!("{}/en/guide/intro", base)), Some("Intro"));
    assert_eq!(
        sitemap.get(&format!("{}/en/guide/advanced", base)),
        Some("Advanced")
    );

    let stats = coordinator.stats().snapshot();
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.relevant, 2);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_sitemap_from_robots_directive() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("User-agent: *\nAllow: /\nSitemap: {}/maps/docs.xml\n", base)),
        )
        .mount(&server)
        .await;
    mount_xml(
        &server,
        "/maps/docs.xml",
        urlset(&[format!("{}/docs/start", base)]),
    )
    .await;
    mount_page(&server, "/docs/start", "Start").await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/docs/", base)]);

    let sitemap = Coordinator::new(config)
        .unwrap()
        .build_sitemap()
        .await
        .unwrap();

    assert_eq!(sitemap.urls(), vec![format!("{}/docs/start", base)]);
}

#[tokio::test]
async fn test_malformed_nested_sitemap_is_isolated() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        urlset(&[
            format!("{}/guide/a", base),
            format!("{}/broken.xml", base),
            format!("{}/guide/b", base),
        ]),
    )
    .await;
    mount_xml(
        &server,
        "/broken.xml",
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"><url><loc>x</url></urlset>"
            .to_string(),
    )
    .await;
    mount_page(&server, "/guide/a", "A").await;
    mount_page(&server, "/guide/b", "B").await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/guide", base)]);
    let coordinator = Coordinator::new(config).unwrap();

    let sitemap = coordinator.build_sitemap().await.unwrap();

    assert_eq!(sitemap.len(), 2);
    assert_eq!(coordinator.stats().snapshot().errors, 1);
}

#[tokio::test]
async fn test_untitled_or_failing_pages_fall_back_to_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        urlset(&[format!("{}/guide/plain", base), format!("{}/guide/gone", base)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/guide/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>no title</p>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/guide", base)]);

    let sitemap = Coordinator::new(config)
        .unwrap()
        .build_sitemap()
        .await
        .unwrap();

    let plain = format!("{}/guide/plain", base);
    assert_eq!(sitemap.get(&plain), Some(plain.as_str()));
    let gone = format!("{}/guide/gone", base);
    assert_eq!(sitemap.get(&gone), Some(gone.as_str()));
}

#[tokio::test]
async fn test_no_sitemap() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/guide", server.uri())]);

    let result = Coordinator::new(config).unwrap().build_sitemap().await;

    assert!(matches!(result, Err(SyncError::NoSitemap { .. })));
}

#[tokio::test]
async fn test_no_relevant_pages() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_xml(
        &server,
        "/sitemap.xml",
        urlset(&[format!("{}/blog/post", base)]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/guide", base)]);

    let result = Coordinator::new(config).unwrap().build_sitemap().await;

    assert!(matches!(result, Err(SyncError::NoPages)));
}

#[tokio::test]
async fn test_domain_mismatch_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        dir.path(),
        vec![
            format!("{}/x", server.uri()),
            "https://b.example.com/y".to_string(),
        ],
    );

    assert!(matches!(
        Coordinator::new(config),
        Err(SyncError::Config(ConfigError::DomainMismatch { .. }))
    ));
}
