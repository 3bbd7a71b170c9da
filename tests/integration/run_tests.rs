//! End-to-end runs driven from a configuration

use proxy_fanout::config::Config;
use proxy_fanout::{run_from_config, FanoutError, RunSummary};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLL_ID: &str = "17338883";
const OPTION_ID: &str = "139529712";

/// Creates a test configuration reading `source` and writing `output`
fn create_test_config(source: &Path, output: &Path, workers: usize, collect: bool) -> Config {
    let mut config = Config::default();
    config.target.base_url = "http://poll.test".to_string();
    config.target.poll_id = POLL_ID.to_string();
    config.target.option_id = OPTION_ID.to_string();
    config.pool.workers = workers;
    config.pool.timeout_secs = 5;
    config.proxies.source = source.to_path_buf();
    config.proxies.collect_successes = collect;
    config.proxies.output = output.to_path_buf();
    config
}

/// Starts a proxy that accepts the vote and expects exactly `hits` of them
async fn live_proxy(hits: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}", POLL_ID)))
        .and(body_string(format!("options={}", OPTION_ID)))
        .respond_with(ResponseTemplate::new(200))
        .expect(hits)
        .mount(&server)
        .await;
    server
}

/// Returns a local address nothing is listening on
fn dead_proxy() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

fn write_json_list(dir: &TempDir, entries: &[String]) -> std::path::PathBuf {
    let path = dir.path().join("proxies.json");
    std::fs::write(&path, serde_json::to_string(entries).unwrap()).unwrap();
    path
}

fn read_clean_list(path: &Path) -> Vec<String> {
    let mut hosts: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    hosts.sort();
    hosts
}

async fn run_bounded(config: &Config) -> Result<RunSummary, FanoutError> {
    tokio::time::timeout(Duration::from_secs(30), run_from_config(config, None))
        .await
        .expect("run did not finish")
}

#[tokio::test]
async fn test_every_success_lands_in_clean_list() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clean-proxies.json");

    let mut proxies = Vec::new();
    for _ in 0..5 {
        proxies.push(live_proxy(1).await);
    }
    let entries: Vec<String> = proxies.iter().map(|p| p.address().to_string()).collect();
    let source = write_json_list(&dir, &entries);

    let config = create_test_config(&source, &output, 3, true);
    let summary = run_bounded(&config).await.unwrap();

    assert_eq!(summary.dispatched, 5);
    assert_eq!(summary.succeeded, 5);
    assert_eq!(summary.workers_joined, 3);

    let report = summary.collector.expect("collector report");
    assert_eq!(report.collected, 5);
    assert!(report.persisted);

    let mut expected = entries.clone();
    expected.sort();
    assert_eq!(read_clean_list(&output), expected);
}

#[tokio::test]
async fn test_collection_disabled_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clean-proxies.json");

    let proxy = live_proxy(2).await;
    let entries = vec![proxy.address().to_string(), proxy.address().to_string()];
    let source = write_json_list(&dir, &entries);

    let config = create_test_config(&source, &output, 2, false);
    let summary = run_bounded(&config).await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert!(summary.collector.is_none());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_dead_and_malformed_proxies_are_left_out() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clean-proxies.json");

    let first = live_proxy(1).await;
    let second = live_proxy(1).await;
    let entries = vec![
        first.address().to_string(),
        dead_proxy(),
        "not a proxy".to_string(),
        format!("http://{}", second.address()),
        dead_proxy(),
    ];
    let source = write_json_list(&dir, &entries);

    let config = create_test_config(&source, &output, 4, true);
    let summary = run_bounded(&config).await.unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.dispatched, 4);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 2);

    let mut expected = vec![first.address().to_string(), second.address().to_string()];
    expected.sort();
    assert_eq!(read_clean_list(&output), expected);
}

#[tokio::test]
async fn test_start_offset_skips_leading_proxies() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clean-proxies.json");

    let skipped = live_proxy(0).await;
    let used = live_proxy(1).await;
    let entries = vec![
        skipped.address().to_string(),
        "bad".to_string(),
        used.address().to_string(),
    ];
    let source = write_json_list(&dir, &entries);

    let mut config = create_test_config(&source, &output, 1, false);
    config.pool.start_offset = 2;
    let summary = run_bounded(&config).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn test_strict_status_counts_rejections_as_failures() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clean-proxies.json");

    let refusing = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&refusing)
        .await;
    let accepting = live_proxy(1).await;

    let entries = vec![
        refusing.address().to_string(),
        accepting.address().to_string(),
    ];
    let source = write_json_list(&dir, &entries);

    let mut config = create_test_config(&source, &output, 2, true);
    config.target.require_success_status = true;
    let summary = run_bounded(&config).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(read_clean_list(&output), vec![accepting.address().to_string()]);
}

#[tokio::test]
async fn test_plain_text_source() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clean-proxies.json");

    let proxy = live_proxy(1).await;
    let source = dir.path().join("proxies.txt");
    std::fs::write(
        &source,
        format!("# scraped list\n\n{}\n", proxy.address()),
    )
    .unwrap();

    let config = create_test_config(&source, &output, 2, true);
    let summary = run_bounded(&config).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(read_clean_list(&output), vec![proxy.address().to_string()]);
}

#[tokio::test]
async fn test_clean_list_feeds_the_next_run() {
    let dir = TempDir::new().unwrap();
    let first_output = dir.path().join("clean-proxies.json");

    let proxy = live_proxy(2).await;
    let source = write_json_list(&dir, &[proxy.address().to_string(), dead_proxy()]);

    let config = create_test_config(&source, &first_output, 2, true);
    run_bounded(&config).await.unwrap();

    let second_output = dir.path().join("clean-again.json");
    let config = create_test_config(&first_output, &second_output, 2, true);
    let summary = run_bounded(&config).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(read_clean_list(&second_output), vec![proxy.address().to_string()]);
}

#[tokio::test]
async fn test_missing_source_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("missing.json");
    let output = dir.path().join("clean-proxies.json");

    let config = create_test_config(&source, &output, 2, true);
    let result = run_bounded(&config).await;

    assert!(matches!(result, Err(FanoutError::Source(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_malformed_source_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("proxies.json");
    std::fs::write(&source, "{ \"not\": \"a list\" }").unwrap();
    let output = dir.path().join("clean-proxies.json");

    let config = create_test_config(&source, &output, 2, false);
    let result = run_bounded(&config).await;

    assert!(matches!(result, Err(FanoutError::Source(_))));
}
