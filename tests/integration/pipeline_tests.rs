//! Harvest pipeline scenarios over the in-memory renderer

use crate::fake::{Event, FakeRenderer, FakeWeb, Reply, SEED};
use pagebench::config::{ContextPolicy, HarvestConfig};
use pagebench::harvest::{HarvestPipeline, PageFetcher};
use pagebench::{BenchError, FetchError};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn harvest_config(output_dir: &Path, page_count: usize, batch_size: usize) -> HarvestConfig {
    HarvestConfig {
        seed_url: SEED.to_string(),
        page_count,
        batch_size,
        timeout_ms: 500,
        output_dir: output_dir.to_string_lossy().into_owned(),
        ..HarvestConfig::default()
    }
}

fn pipeline(web: &Arc<FakeWeb>, config: &HarvestConfig, policy: ContextPolicy) -> HarvestPipeline {
    let fetcher = PageFetcher::new(
        Arc::new(FakeRenderer(Arc::clone(web))),
        Duration::from_millis(config.timeout_ms),
        policy,
    );
    HarvestPipeline::new(fetcher, config).expect("Failed to build pipeline")
}

/// Names of the files in `dir`
fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .expect("Failed to read output dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn test_harvest_caps_links_and_runs_two_batches() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    let links = web.seed_with_links(25);
    for (i, url) in links.iter().enumerate() {
        web.page(url, &format!("Page {}", i), 5 + (i as u64 % 4) * 5);
    }

    let config = harvest_config(&out, 20, 10);
    let report = pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(report.discovered, 20);
    assert_eq!(report.batches, 2);
    assert_eq!(report.persisted.len(), 20);

    // Seed plus exactly the first 20 links
    let started = web.started();
    assert_eq!(started.len(), 21);
    assert_eq!(started[0], SEED);
    let fetched: BTreeSet<_> = started[1..].iter().cloned().collect();
    let expected: BTreeSet<_> = links[..20].iter().cloned().collect();
    assert_eq!(fetched, expected);

    let names = file_names(&out);
    assert_eq!(names.len(), 20);
    assert!(names.contains("Page 0.html"));
    assert!(names.contains("Page 19.html"));
    assert!(!names.contains("Page 20.html"));

    assert!(web.peak() <= 10);
    // Fresh context per fetch, each released
    assert_eq!(web.launches(), 21);
    assert_eq!(web.closes(), 21);
}

#[tokio::test]
async fn test_second_batch_waits_for_first() {
    let temp = TempDir::new().unwrap();
    let web = FakeWeb::new();
    let links = web.seed_with_links(8);
    for (i, url) in links.iter().enumerate() {
        // The first batch has one slow page
        let delay = if i == 0 { 80 } else { 5 };
        web.page(url, &format!("Page {}", i), delay);
    }

    let config = harvest_config(&temp.path().join("pages"), 8, 4);
    pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .unwrap();

    let events = web.events();
    let position = |event: Event| events.iter().position(|e| *e == event).unwrap();

    let last_first_batch_finish = links[..4]
        .iter()
        .map(|url| position(Event::Finish(url.clone())))
        .max()
        .unwrap();
    let first_second_batch_start = links[4..]
        .iter()
        .map(|url| position(Event::Start(url.clone())))
        .min()
        .unwrap();

    assert!(last_first_batch_finish < first_second_batch_start);
    assert!(web.peak() <= 4);
}

#[tokio::test]
async fn test_duplicate_titles_get_suffixes() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    let links = web.seed_with_links(3);
    web.page(&links[0], "Rust", 5);
    web.page(&links[1], "Rust", 15);
    web.page(&links[2], "Rust", 25);

    let config = harvest_config(&out, 3, 10);
    pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .unwrap();

    let names = file_names(&out);
    let expected: BTreeSet<String> = ["Rust.html", "Rust (1).html", "Rust (2).html"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_suffix_follows_completion_order() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    let links = web.seed_with_links(2);
    // The first link finishes last
    web.page(&links[0], "Rust", 60);
    web.page(&links[1], "Rust", 5);

    let config = harvest_config(&out, 2, 10);
    pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .unwrap();

    let first = std::fs::read_to_string(out.join("Rust.html")).unwrap();
    let second = std::fs::read_to_string(out.join("Rust (1).html")).unwrap();
    assert!(first.contains(&links[1]));
    assert!(second.contains(&links[0]));
}

#[tokio::test]
async fn test_literal_suffixed_title_is_not_overwritten() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    let links = web.seed_with_links(3);
    web.page(&links[0], "Rust", 5);
    web.page(&links[1], "Rust", 15);
    web.page(&links[2], "Rust (1)", 25);

    let config = harvest_config(&out, 3, 10);
    let report = pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .unwrap();

    let persisted: BTreeSet<_> = report.persisted.iter().cloned().collect();
    assert_eq!(persisted.len(), 3);

    let expected: BTreeSet<String> = ["Rust.html", "Rust (1).html", "Rust (1) (1).html"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(file_names(&out), expected);

    let literal = std::fs::read_to_string(out.join("Rust (1) (1).html")).unwrap();
    assert!(literal.contains(&links[2]));
}

#[tokio::test]
async fn test_unsafe_titles_are_sanitized() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    let links = web.seed_with_links(3);
    web.page(&links[0], "My:Title?", 1);
    web.page(&links[1], "a/b\\c", 1);
    web.page(&links[2], "...", 1);

    let config = harvest_config(&out, 3, 10);
    pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .unwrap();

    let names = file_names(&out);
    assert!(names.contains("MyTitle.html"));
    assert!(names.contains("abc.html"));
    assert!(names.contains("untitled.html"));
}

#[tokio::test]
async fn test_timeout_fails_batch_but_keeps_sibling_writes() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    let links = web.seed_with_links(20);
    for (i, url) in links.iter().enumerate() {
        web.page(url, &format!("Page {}", i), 10);
    }
    web.reply(&links[3], Reply::Hang);

    let mut config = harvest_config(&out, 20, 10);
    config.timeout_ms = 200;
    let result = pipeline(&web, &config, ContextPolicy::PerFetch).run().await;

    match result {
        Err(BenchError::Fetch(FetchError::Timeout { url, timeout_ms })) => {
            assert_eq!(url, links[3]);
            assert_eq!(timeout_ms, 200);
        }
        other => panic!("expected a timeout, got {:?}", other),
    }

    // The nine siblings were written; the second batch never started
    assert_eq!(file_names(&out).len(), 9);
    assert!(!web.started().contains(&links[10]));
    assert_eq!(web.launches(), web.closes());
}

#[tokio::test]
async fn test_seed_failure_is_discovery_error() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    web.reply(SEED, Reply::Fail);

    let config = harvest_config(&out, 5, 5);
    let result = pipeline(&web, &config, ContextPolicy::PerFetch).run().await;

    assert!(matches!(result, Err(BenchError::Discovery { ref url, .. }) if url == SEED));
    // Init ran before discovery
    assert!(out.is_dir());
    assert!(file_names(&out).is_empty());
}

#[tokio::test]
async fn test_existing_output_is_replaced() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("stale.html"), "old").unwrap();

    let web = FakeWeb::new();
    let links = web.seed_with_links(1);
    web.page(&links[0], "Fresh", 1);

    let config = harvest_config(&out, 1, 1);
    pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .unwrap();

    let names = file_names(&out);
    assert_eq!(names.len(), 1);
    assert!(names.contains("Fresh.html"));
}

#[tokio::test]
async fn test_seed_without_links_saves_nothing() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    web.seed_with_links(0);

    let config = harvest_config(&out, 10, 5);
    let report = pipeline(&web, &config, ContextPolicy::PerFetch)
        .run()
        .await
        .unwrap();

    assert_eq!(report.discovered, 0);
    assert_eq!(report.batches, 0);
    assert!(file_names(&out).is_empty());
}

#[tokio::test]
async fn test_reuse_policy_limits_launches() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("pages");
    let web = FakeWeb::new();
    let links = web.seed_with_links(12);
    for (i, url) in links.iter().enumerate() {
        web.page(url, &format!("Page {}", i), 5);
    }

    let config = harvest_config(&out, 12, 4);
    pipeline(&web, &config, ContextPolicy::Reuse)
        .run()
        .await
        .unwrap();

    assert_eq!(file_names(&out).len(), 12);
    assert!(web.launches() <= 4);
    // Idle contexts are closed when the run ends
    assert_eq!(web.launches(), web.closes());
}
