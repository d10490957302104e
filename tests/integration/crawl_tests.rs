//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::path::Path;
use std::time::Duration;
use sumi_harvest::config::Config;
use sumi_harvest::crawler::{run_crawl, Coordinator};
use sumi_harvest::output::generate_markdown_summary;
use sumi_harvest::state::CrawlPhase;
use tempfile::TempDir;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at `seed` writing into `image_dir`
fn create_test_config(seed: &str, image_dir: &Path) -> Config {
    let mut config = Config::new(seed, image_dir);
    config.crawler.request_timeout = 2;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn image(bytes: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(bytes.to_vec())
        .insert_header("content-type", "image/png")
}

async fn mount_page(server: &MockServer, route: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_seed_about_logo_scenario() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/about">About</a><img src="/logo.png">"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/about",
        &format!(
            r#"<a href="{}/">Elsewhere</a><img src="/logo.png">"#,
            other_server.uri()
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(image(b"LOGO"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Different port, different authority: must never be fetched
    Mock::given(any())
        .respond_with(html("other"))
        .expect(0)
        .mount(&other_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", base_url), dir.path());

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(
        report.visit_order,
        vec![format!("{}/", base_url), format!("{}/about", base_url)]
    );
    assert_eq!(report.stats.pages_visited, 2);
    assert_eq!(report.stats.images_submitted, 1);
    assert_eq!(report.stats.images_downloaded, 1);
    assert_eq!(report.stats.links_off_domain, 1);
    assert!(report.is_clean());

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec![std::ffi::OsString::from("logo.png")]);
    assert_eq!(std::fs::read(dir.path().join("logo.png")).unwrap(), b"LOGO");

    mock_server.verify().await;
    other_server.verify().await;
}

#[tokio::test]
async fn test_breadth_first_order() {
    let mock_server = MockServer::start().await;

    // Depth 0: /         -> /a, /b
    // Depth 1: /a        -> /a/deep
    //          /b        -> /c
    // Depth 2: /a/deep, /c
    mount_page(&mock_server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;
    mount_page(&mock_server, "/a", r#"<a href="/a/deep">Deep</a>"#, 1).await;
    mount_page(&mock_server, "/b", r#"<a href="/c">C</a><a href="/a">A again</a>"#, 1).await;
    mount_page(&mock_server, "/a/deep", r#"<a href="/">Home</a>"#, 1).await;
    mount_page(&mock_server, "/c", "", 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    let base = mock_server.uri();
    assert_eq!(
        report.visit_order,
        vec![
            format!("{}/", base),
            format!("{}/a", base),
            format!("{}/b", base),
            format!("{}/a/deep", base),
            format!("{}/c", base),
        ]
    );
    assert_eq!(report.stats.max_depth_reached, 2);
}

#[tokio::test]
async fn test_fragment_variants_visited_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r##"<a href="/page#a">A</a><a href="/page#b">B</a><a href="#top">Top</a>"##,
        1,
    )
    .await;
    mount_page(&mock_server, "/page", r##"<a href="/page#c">Self</a>"##, 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/#intro", mock_server.uri()), dir.path());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_visited, 2);
    assert_eq!(coordinator.visited().len(), 2);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/fine">Fine</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string(r#"<a href="/secret">never followed</a><img src="/never.png">"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fine", r#"<img src="/ok.png">"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/ok.png"))
        .respond_with(image(b"OK"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secret"))
        .respond_with(html(""))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/never.png"))
        .respond_with(image(b"NO"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(report.stats.pages_visited, 3);
    assert_eq!(report.stats.pages_failed, 1);
    assert_eq!(report.failed_pages.len(), 1);
    assert!(report.failed_pages[0].url.ends_with("/broken"));
    assert!(dir.path().join("ok.png").exists());
    mock_server.verify().await;
}

#[tokio::test]
async fn test_timeout_page_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/slow">Slow</a><a href="/fast">Fast</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("late").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", "", 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawler.request_timeout = 1;

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_visited, 3);
    assert_eq!(report.stats.pages_failed, 1);
    assert!(report.failed_pages[0].message.contains("timeout"));
}

#[tokio::test]
async fn test_images_from_other_hosts_are_downloaded() {
    let mock_server = MockServer::start().await;
    let cdn_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<img src="{cdn}/art/night-watch.jpg"><a href="{cdn}/gallery">CDN page</a>"#,
            cdn = cdn_server.uri()
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/art/night-watch.jpg"))
        .respond_with(image(b"JPEG"))
        .expect(1)
        .mount(&cdn_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gallery"))
        .respond_with(html(""))
        .expect(0)
        .mount(&cdn_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.images_downloaded, 1);
    assert_eq!(report.stats.links_off_domain, 1);
    assert_eq!(
        std::fs::read(dir.path().join("night-watch.jpg")).unwrap(),
        b"JPEG"
    );
    cdn_server.verify().await;
}

#[tokio::test]
async fn test_image_failures_are_isolated() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<img src="/gallery/"><img src="/missing.png"><img src="/good.png"><a href="/next">Next</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/next", r#"<img src="/gallery/">"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/gallery/"))
        .respond_with(image(b"DIR"))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/good.png"))
        .respond_with(image(b"GOOD"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    // The unnamed image is claimed once and never retried from /next
    assert_eq!(report.stats.images_submitted, 3);
    assert_eq!(report.stats.images_unnamed, 1);
    assert_eq!(report.stats.images_failed, 1);
    assert_eq!(report.stats.images_downloaded, 1);
    assert_eq!(report.failed_images.len(), 2);
    assert_eq!(report.stats.pages_visited, 2);
    assert!(dir.path().join("good.png").exists());
    mock_server.verify().await;
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/level1">1</a>"#, 1).await;
    mount_page(&mock_server, "/level1", r#"<a href="/level2">2</a>"#, 1).await;
    mount_page(&mock_server, "/level2", r#"<a href="/level3">3</a>"#, 1).await;
    mount_page(&mock_server, "/level3", "", 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawler.max_depth = Some(2);

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_visited, 3);
    assert_eq!(report.stats.links_beyond_depth, 1);
    assert_eq!(report.stats.max_depth_reached, 2);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_worker_pool_preserves_dedup() {
    let mock_server = MockServer::start().await;

    // Every page links to every other page and shows the same images
    let pages = ["/", "/p1", "/p2", "/p3", "/p4", "/p5"];
    let links: String = pages
        .iter()
        .map(|p| format!(r#"<a href="{}">x</a>"#, p))
        .collect();
    let body = format!(
        r#"{}<img src="/shared.png"><img src="/also-shared.png">"#,
        links
    );
    for page in pages {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(&body).set_delay(Duration::from_millis(50)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/shared.png"))
        .respond_with(image(b"S"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/also-shared.png"))
        .respond_with(image(b"A"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawler.max_concurrent_fetches = 4;

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_visited, 6);
    assert_eq!(report.visit_order.len(), 6);
    assert_eq!(report.stats.images_downloaded, 2);
    assert_eq!(coordinator.frontier_size(), 0);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_worker_pool_keeps_shortest_depth() {
    let mock_server = MockServer::start().await;

    // Shortest path to /p is / -> /slow -> /p (depth 2), so /q is depth 3.
    // /slow answers late; /fast -> /m -> /p is one level longer. Level 2
    // only opens once /slow is done, so /p keeps depth 2.
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/slow">Slow</a><a href="/fast">Fast</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(r#"<a href="/p">P</a>"#).set_delay(Duration::from_millis(1500)))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", r#"<a href="/m">M</a>"#, 1).await;
    mount_page(&mock_server, "/m", r#"<a href="/p">P</a>"#, 1).await;
    mount_page(&mock_server, "/p", r#"<a href="/q">Q</a>"#, 1).await;
    mount_page(&mock_server, "/q", "", 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawler.max_concurrent_fetches = 4;
    config.crawler.max_depth = Some(3);

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    let base = mock_server.uri();
    assert_eq!(
        report.visit_order,
        vec![
            format!("{}/", base),
            format!("{}/slow", base),
            format!("{}/fast", base),
            format!("{}/m", base),
            format!("{}/p", base),
            format!("{}/q", base),
        ]
    );
    assert_eq!(report.stats.links_beyond_depth, 0);
    assert_eq!(report.stats.max_depth_reached, 3);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_links_resolve_against_requested_url_after_redirect() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/dir">Dir</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/dir"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/dir/"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/dir/", r#"<a href="child">Child</a>"#, 1).await;
    mount_page(&mock_server, "/child", "", 1).await;
    mount_page(&mock_server, "/dir/child", "", 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    let base = mock_server.uri();
    assert_eq!(
        report.visit_order,
        vec![
            format!("{}/", base),
            format!("{}/dir", base),
            format!("{}/child", base),
        ]
    );
    mock_server.verify().await;
}

#[tokio::test]
async fn test_non_html_seed_yields_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(image(&[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(report.stats.pages_visited, 1);
    assert_eq!(report.stats.pages_failed, 0);
    assert_eq!(report.stats.images_submitted, 0);
}

#[tokio::test]
async fn test_run_crawl_writes_summary() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/gone">Gone</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("nested/images"));

    let report = run_crawl(config).await.unwrap();
    assert!(dir.path().join("nested/images").is_dir());
    assert!(!report.is_clean());

    let summary_path = dir.path().join("summary.md");
    generate_markdown_summary(&report, &summary_path).unwrap();

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("## Pages Visited (2)"));
    assert!(summary.contains("## Failed Pages (1)"));
    assert!(summary.contains(&format!("{}/gone", mock_server.uri())));
}
