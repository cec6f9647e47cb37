use crate::{mount_page, mount_xml, test_config, urlset};
use docsync::crawler::{crawl, Coordinator};
use docsync::output::URL_LIST_FILE;
use docsync::select::SelectAll;
use docsync::{calculate_hash, PageState, StateStore};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_V1: &str = "<html><head><title>Intro</title></head><body><h1>Intro</h1><p>First.</p></body></html>";
const PAGE_V2: &str = "<html><head><title>Intro</title></head><body><h1>Intro</h1><p>Second.</p></body></html>";

async fn mount_body(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_change_detection_across_runs() {
    let server = MockServer::start().await;
    mount_body(&server, "/en/guide/intro", PAGE_V1).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), vec![]);
    config.output.html = true;
    let url = format!("{}/en/guide/intro", server.uri());
    let urls = vec![url.clone()];
    let md_path = dir.path().join("content/en/guide/intro.md");
    let html_path = dir.path().join("content/en/guide/intro.html");
    let store = StateStore::new(&config.output.state_path);

    // First run writes everything and records the hash
    let coordinator = Coordinator::new(config.clone()).unwrap();
    let report = coordinator.sync_pages(&urls).await.unwrap();
    assert_eq!(report.written, 1);
    assert_eq!(std::fs::read_to_string(&html_path).unwrap(), PAGE_V1);
    assert!(std::fs::read_to_string(&md_path).unwrap().contains("First."));
    assert_eq!(store.load().get(&url), Some(calculate_hash(PAGE_V1).as_str()));

    // Same content: nothing is written
    std::fs::write(&md_path, "local edit").unwrap();
    let coordinator = Coordinator::new(config.clone()).unwrap();
    let report = coordinator.sync_pages(&urls).await.unwrap();
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.written, 0);
    assert_eq!(std::fs::read_to_string(&md_path).unwrap(), "local edit");
    assert_eq!(store.load().get(&url), Some(calculate_hash(PAGE_V1).as_str()));

    // Changed content: outputs and state are updated
    server.reset().await;
    mount_body(&server, "/en/guide/intro", PAGE_V2).await;
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.sync_pages(&urls).await.unwrap();
    assert_eq!(report.written, 1);
    assert!(std::fs::read_to_string(&md_path).unwrap().contains("Second."));
    assert_eq!(store.load().get(&url), Some(calculate_hash(PAGE_V2).as_str()));
}

#[tokio::test]
async fn test_failures_do_not_stop_other_pages() {
    let server = MockServer::start().await;
    mount_body(&server, "/a", PAGE_V1).await;
    mount_body(&server, "/b", PAGE_V2).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![]);
    let state_path = config.output.state_path.clone();
    let urls = vec![
        format!("{}/a", server.uri()),
        format!("{}/missing", server.uri()),
        format!("{}/b", server.uri()),
    ];

    let report = Coordinator::new(config)
        .unwrap()
        .sync_pages(&urls)
        .await
        .unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.stats.errors, 1);

    let state = StateStore::new(state_path).load();
    assert_eq!(state.len(), 2);
    assert!(state.get(&urls[1]).is_none());
}

#[tokio::test]
async fn test_failed_write_keeps_page_unrecorded() {
    let server = MockServer::start().await;
    mount_body(&server, "/a", PAGE_V1).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), vec![]);
    // A regular file where the output root should be
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    config.output.content_dir = blocker;
    let state_path = config.output.state_path.clone();

    let url = format!("{}/a", server.uri());
    let report = Coordinator::new(config)
        .unwrap()
        .sync_pages(&[url.clone()])
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.written, 0);
    assert_eq!(StateStore::new(state_path).load(), PageState::new());
}

#[tokio::test]
async fn test_flattened_output() {
    let server = MockServer::start().await;
    mount_body(&server, "/en/guide/intro", PAGE_V1).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), vec![]);
    config.output.flatten = true;
    config.output.markdown = false;
    config.output.text = true;

    Coordinator::new(config)
        .unwrap()
        .sync_pages(&[format!("{}/en/guide/intro", server.uri())])
        .await
        .unwrap();

    let text = std::fs::read_to_string(dir.path().join("content/en_guide_intro.txt")).unwrap();
    assert_eq!(text, "Intro\n\nFirst.\n");
}

#[tokio::test]
async fn test_pool_bounds_total_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE_V1)
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![]);
    let urls: Vec<String> = (0..8)
        .map(|i| format!("{}/page-{}", server.uri(), i))
        .collect();

    let start = Instant::now();
    let report = Coordinator::new(config)
        .unwrap()
        .sync_pages(&urls)
        .await
        .unwrap();

    assert_eq!(report.written, 8);
    // Two waves on four workers; serial fetching would take 1.6s
    assert!(start.elapsed() < Duration::from_millis(1200));
}

#[tokio::test]
async fn test_full_crawl_with_select_all() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        urlset(&[format!("{}/en/guide/intro", base), format!("{}/en/guide/setup", base)]),
    )
    .await;
    mount_page(&server, "/en/guide/intro", "Intro").await;
    mount_page(&server, "/en/guide/setup", "Setup").await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), vec![format!("{}/en/guide/overview", base)]);

    let report = crawl(config, &mut SelectAll).await.unwrap();

    assert_eq!(report.written, 2);
    assert!(dir.path().join("content/en/guide/intro.md").exists());
    assert!(dir.path().join("content/en/guide/setup.md").exists());

    let list = std::fs::read_to_string(dir.path().join("urls/en").join(URL_LIST_FILE)).unwrap();
    assert_eq!(
        list,
        format!("{}/en/guide/intro\n{}/en/guide/setup\n", base, base)
    );
}
