//! End-to-end harvests through the HTTP renderer
//!
//! These tests use wiremock to serve a seed page and its linked pages.

use pagebench::config::{ContextPolicy, HarvestConfig, RendererKind};
use pagebench::harvest::harvest;
use pagebench::{BenchError, FetchError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn create_test_config(seed_url: String, output_dir: &Path, page_count: usize) -> HarvestConfig {
    HarvestConfig {
        seed_url,
        page_count,
        batch_size: 2,
        timeout_ms: 2_000,
        output_dir: output_dir.to_string_lossy().into_owned(),
        renderer: RendererKind::Http,
        context_policy: ContextPolicy::PerFetch,
        user_agent: "pagebench-test".to_string(),
        ..HarvestConfig::default()
    }
}

#[tokio::test]
async fn test_http_harvest_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/wiki/Seed",
        html_page(
            "Seed",
            &format!(
                r##"<a href="/wiki/Alpha">Alpha</a>
                <a class="x" href="/wiki/Beta">Beta</a>
                <a href="#section">skip</a>
                <a href="/wiki/Alpha">again</a>
                <a href="{}/wiki/Gamma">absolute</a>
                <a href="mailto:someone@example.com">mail</a>"##,
                base_url
            ),
        ),
    )
    .await;
    mount_page(&mock_server, "/wiki/Alpha", html_page("Alpha: first?", "a")).await;
    mount_page(&mock_server, "/wiki/Beta", html_page("Beta", "b")).await;
    mount_page(&mock_server, "/wiki/Gamma", html_page("Beta", "g")).await;

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let config = create_test_config(format!("{}/wiki/Seed", base_url), &out, 10);

    let report = harvest(&config).await.expect("Harvest failed");

    assert_eq!(report.discovered, 3);
    assert_eq!(report.batches, 2);
    assert_eq!(report.persisted.len(), 3);

    assert!(out.join("Alpha first.html").exists());
    assert!(out.join("Beta.html").exists());
    assert!(out.join("Beta (1).html").exists());

    let alpha = std::fs::read_to_string(out.join("Alpha first.html")).unwrap();
    assert!(alpha.contains("<title>Alpha: first?</title>"));
}

#[tokio::test]
async fn test_http_harvest_respects_page_count() {
    let mock_server = MockServer::start().await;
    let anchors: String = (0..5)
        .map(|i| format!("<a href=\"/p{}\">p</a>", i))
        .collect();
    mount_page(&mock_server, "/", html_page("Index", &anchors)).await;
    for i in 0..5 {
        mount_page(
            &mock_server,
            &format!("/p{}", i),
            html_page(&format!("Page {}", i), ""),
        )
        .await;
    }

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let config = create_test_config(format!("{}/", mock_server.uri()), &out, 2);

    let report = harvest(&config).await.unwrap();

    assert_eq!(report.persisted.len(), 2);
    assert!(out.join("Page 0.html").exists());
    assert!(out.join("Page 1.html").exists());
    assert!(!out.join("Page 2.html").exists());
}

#[tokio::test]
async fn test_http_error_page_fails_run() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        html_page("Index", r#"<a href="/ok">ok</a><a href="/missing">missing</a>"#),
    )
    .await;
    mount_page(&mock_server, "/ok", html_page("Ok", "")).await;
    mount_page(&mock_server, "/missing", ResponseTemplate::new(404)).await;

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let config = create_test_config(format!("{}/", mock_server.uri()), &out, 10);

    let result = harvest(&config).await;

    match result {
        Err(BenchError::Fetch(FetchError::Navigation { url, message })) => {
            assert!(url.ends_with("/missing"));
            assert_eq!(message, "HTTP 404");
        }
        other => panic!("expected a navigation error, got {:?}", other),
    }
    assert!(out.join("Ok.html").exists());
}

#[tokio::test]
async fn test_unreachable_seed_is_discovery_error() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", ResponseTemplate::new(500)).await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(
        format!("{}/", mock_server.uri()),
        &temp.path().join("pages"),
        10,
    );

    let result = harvest(&config).await;

    assert!(matches!(result, Err(BenchError::Discovery { .. })));
}
