//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_sweep::config::{CrawlConfig, Settings};
use site_sweep::crawler::{crawl, crawl_until_cancelled};
use site_sweep::output::{format_log, write_log_file};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at the mock server
fn create_test_config(seed: &str, max_depth: u32, concurrency: u32) -> CrawlConfig {
    let mut settings = Settings::default();
    settings.crawler.max_depth = max_depth;
    settings.crawler.concurrency = concurrency;
    settings.crawler.base_delay_ms = 5; // Very short for testing
    settings.crawler.jitter_ms = 5;
    settings.http.request_timeout_secs = 5;
    CrawlConfig::with_seed(seed, &settings).expect("valid test config")
}

/// Mounts an HTML page at `page_path`
async fn mount_html(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a path that must never be requested
async fn mount_never(server: &MockServer, page_path: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// A URL on the same server that is outside the allowed domains
fn out_of_scope(server: &MockServer, page_path: &str) -> String {
    format!("http://localhost:{}{}", server.address().port(), page_path)
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        &format!(
            r#"<a href="/">Home</a>
               <a href="/about">About</a>
               <a href="/contact#form">Contact</a>
               <a href="{}">Elsewhere</a>
               <a href="mailto:team@example.com">Mail</a>
               <img src="/logo.png">"#,
            out_of_scope(&server, "/secret")
        ),
    )
    .await;
    mount_html(&server, "/about", r#"<a href="/team">Team</a>"#).await;
    mount_html(&server, "/contact", r#"<script src="/app.js"></script>"#).await;
    mount_never(&server, "/secret").await;
    mount_never(&server, "/team").await;
    mount_never(&server, "/logo.png").await;
    mount_never(&server, "/app.js").await;

    let report = crawl(create_test_config(&base, 1, 1))
        .await
        .expect("crawl should succeed");

    assert_eq!(
        report.result.pages,
        vec![
            format!("{}/", base),
            format!("{}/about", base),
            format!("{}/contact", base)
        ]
    );
    assert_eq!(
        report.result.assets,
        vec![format!("{}/logo.png", base), format!("{}/app.js", base)]
    );
    assert_eq!(report.stats.visited, 3);
    assert_eq!(report.stats.failed(), 0);
    assert!(!report.stats.cancelled);
}

#[tokio::test]
async fn test_http_error_excluded_from_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/fine">Fine</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_html(&server, "/fine", "").await;

    let report = crawl(create_test_config(&base, 2, 2)).await.unwrap();

    assert_eq!(report.result.pages.len(), 2);
    assert!(report.result.pages.contains(&format!("{}/fine", base)));
    assert!(!report.result.pages.contains(&format!("{}/broken", base)));
    assert_eq!(report.stats.http_errors, 1);
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..6)
        .map(|i| format!(r#"<a href="/section/{}">s</a>"#, i))
        .collect();
    mount_html(&server, "/", &links).await;
    for i in 0..6 {
        mount_html(
            &server,
            &format!("/section/{}", i),
            r#"<a href="/shared">Shared</a><a href="/">Home</a>"#,
        )
        .await;
    }
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>shared</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(&base, 3, 4)).await.unwrap();

    assert_eq!(report.result.pages.len(), 8);
    assert_eq!(report.result.pages[0], format!("{}/", base));
    let mut unique = report.result.pages.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), report.result.pages.len());
}

#[tokio::test]
async fn test_redirect_within_domain_records_final_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    mount_html(&server, "/new", "moved here").await;

    let report = crawl(create_test_config(&base, 2, 1)).await.unwrap();

    assert_eq!(
        report.result.pages,
        vec![format!("{}/", base), format!("{}/new", base)]
    );
}

#[tokio::test]
async fn test_redirect_out_of_scope_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", r#"<a href="/leave">Leave</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/leave"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", out_of_scope(&server, "/outside").as_str()),
        )
        .mount(&server)
        .await;
    mount_never(&server, "/outside").await;

    let report = crawl(create_test_config(&base, 2, 1)).await.unwrap();

    assert_eq!(report.result.pages, vec![format!("{}/", base)]);
    assert_eq!(report.stats.http_errors, 1);
}

#[tokio::test]
async fn test_non_html_response_not_parsed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", r#"<a href="/data.json">Data</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"html": "<a href='/hidden'>x</a>"}"#, "application/json"),
        )
        .mount(&server)
        .await;
    mount_never(&server, "/hidden").await;

    let report = crawl(create_test_config(&base, 3, 1)).await.unwrap();

    assert_eq!(
        report.result.pages,
        vec![format!("{}/", base), format!("{}/data.json", base)]
    );
}

#[tokio::test]
async fn test_seed_failure_yields_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(&server.uri(), 3, 2)).await.unwrap();

    assert!(report.result.pages.is_empty());
    assert!(report.result.assets.is_empty());
    assert_eq!(report.stats.http_errors, 1);
    assert_eq!(
        format_log(&report.result),
        "0 Pages Found: \n\n0 Assests Found: \n"
    );
}

#[tokio::test]
async fn test_concurrency_limit_respected() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..8)
        .map(|i| format!(r#"<a href="/slow/{}">s</a>"#, i))
        .collect();
    mount_html(&server, "/", &links).await;
    for i in 0..8 {
        Mock::given(method("GET"))
            .and(path(format!("/slow/{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>slow</p>", "text/html")
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
    }

    let mut settings = Settings::default();
    settings.crawler.concurrency = 2;
    settings.crawler.base_delay_ms = 0;
    settings.crawler.jitter_ms = 0;
    let config = CrawlConfig::with_seed(&base, &settings).unwrap();

    let start = Instant::now();
    let report = crawl(config).await.unwrap();

    assert_eq!(report.result.pages.len(), 9);
    // Eight 200ms fetches, at most two at a time.
    assert!(start.elapsed() >= Duration::from_millis(800));
}

#[tokio::test]
async fn test_cancellation_returns_partial_result() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", r#"<a href="/stuck">Stuck</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/stuck"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>late</p>", "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let report = crawl_until_cancelled(create_test_config(&base, 2, 1), token)
        .await
        .unwrap();

    assert_eq!(report.result.pages, vec![format!("{}/", base)]);
    assert!(report.stats.cancelled);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_log_file_written_for_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<a href="/about">About</a><link href="/style.css"><img src="/hero.jpg">"#,
    )
    .await;
    mount_html(&server, "/about", r#"<img src="/hero.jpg">"#).await;

    let config = create_test_config(&base, 2, 1);
    let domain = config.domain.clone();
    let report = crawl(config).await.unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_log_file(dir.path(), &domain, &report.result).unwrap();

    assert_eq!(path, dir.path().join("127.0.0.1_log.txt"));
    let expected = format!(
        "2 Pages Found: \n{base}/\n{base}/about\n\n1 Assests Found: \n{base}/hero.jpg\n",
        base = base
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
}
