// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{d, test_settings, wait_until, MemorySinks, MockEngine, StaticProvider};
use certsweep::application::{Scanner, ScannerComponents};
use certsweep::domain::models::ProbeDefinition;
use certsweep::infrastructure::metrics::ScanCounters;
use certsweep::queue::Admission;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    scanner: Scanner,
    sinks: MemorySinks,
    provider: Arc<StaticProvider>,
}

fn harness(engine: MockEngine, provider: StaticProvider, workers: usize) -> Harness {
    let settings = test_settings(workers, 8);
    let probes = settings.probes();
    let counters = Arc::new(ScanCounters::new(&probes));
    let sinks = MemorySinks::new(&probes);
    let provider = Arc::new(provider);

    let scanner = Scanner::with_components(
        settings,
        counters,
        ScannerComponents {
            engine: Arc::new(engine),
            expander: provider.clone(),
            feed: None,
            sinks: sinks.sink_set(),
        },
    );

    Harness {
        scanner,
        sinks,
        provider,
    }
}

#[tokio::test]
async fn test_discovered_subdomains_are_scanned() {
    let provider = StaticProvider::new().with("a.example", &["s1.a.example", "s2.a.example"]);
    let mut h = harness(MockEngine::new(), provider, 2);

    assert_eq!(h.scanner.seed(["a.example"]), 1);
    h.scanner.start();

    let counters = h.scanner.counters().clone();
    assert!(wait_until(|| counters.scanned() == 3, Duration::from_secs(5)).await);

    let snapshot = h.scanner.shutdown().await;
    assert_eq!(snapshot.discovered, 2);
    assert_eq!(snapshot.scanned, 3);
    assert_eq!(snapshot.total_matches(), 0);

    let dedup = h.scanner.gate().dedup();
    assert_eq!(dedup.len(), 3);
    for name in ["a.example", "s1.a.example", "s2.a.example"] {
        assert!(dedup.contains(&d(name)), "{} missing from dedup", name);
    }

    let mut queried = h.provider.queried();
    queried.sort();
    assert_eq!(queried, vec!["a.example", "s1.a.example", "s2.a.example"]);
}

#[tokio::test]
async fn test_scanned_counts_domains_without_results() {
    let mut h = harness(MockEngine::new(), StaticProvider::new(), 1);

    h.scanner.seed(["lonely.example"]);
    h.scanner.start();

    let counters = h.scanner.counters().clone();
    assert!(wait_until(|| counters.scanned() == 1, Duration::from_secs(5)).await);

    let snapshot = h.scanner.shutdown().await;
    assert_eq!(snapshot.scanned, 1);
    assert_eq!(snapshot.discovered, 0);
    assert_eq!(h.sinks.domain_log.lines(), vec!["lonely.example"]);
}

#[tokio::test]
async fn test_matches_are_written_to_probe_sinks() {
    let engine = MockEngine::new()
        .route(
            "https://vuln.example/.env",
            200,
            Some("text/plain"),
            "APP_NAME=x\nAPP_KEY=base64:abc",
        )
        .route(
            "https://vuln.example/.git/config",
            200,
            Some("text/plain"),
            "<html>not found</html>",
        )
        .route(
            "http://vuln.example/.git/config",
            200,
            Some("text/plain"),
            "[core]\n\trepositoryformatversion = 0",
        )
        .route(
            "https://vuln.example/phpinfo.php",
            200,
            Some("application/json"),
            "PHP Version 8.2",
        );
    let mut h = harness(engine, StaticProvider::new(), 1);

    h.scanner.seed(["vuln.example"]);
    h.scanner.start();

    let counters = h.scanner.counters().clone();
    assert!(wait_until(|| counters.scanned() == 1, Duration::from_secs(5)).await);
    let snapshot = h.scanner.shutdown().await;

    assert_eq!(snapshot.matches_for("env"), Some(1));
    assert_eq!(snapshot.matches_for("git"), Some(1));
    assert_eq!(snapshot.matches_for("phpinfo"), Some(0));

    assert_eq!(h.sinks.probe_lines("env"), vec!["https://vuln.example/.env"]);
    assert_eq!(
        h.sinks.probe_lines("git"),
        vec!["http://vuln.example/.git/config"]
    );
    assert!(h.sinks.probe_lines("phpinfo").is_empty());
}

#[tokio::test]
async fn test_shutdown_drains_queue_and_closes_admission() {
    let mut h = harness(MockEngine::new(), StaticProvider::new(), 1);

    let seeds = ["q1.example", "q2.example", "q3.example", "q4.example", "q5.example"];
    assert_eq!(h.scanner.seed(seeds), 5);

    h.scanner.start();
    let snapshot = h.scanner.shutdown().await;

    assert_eq!(snapshot.scanned, 5);
    assert!(h.scanner.gate().queue().is_empty());
    assert_eq!(h.sinks.domain_log.lines().len(), 5);
    assert!(h.sinks.domain_log.is_closed());
    assert!(h
        .sinks
        .probes
        .values()
        .all(|sink| sink.is_closed()));

    assert_eq!(h.scanner.gate().admit(d("late.example")), Admission::Dropped);
    assert!(!h.scanner.gate().dedup().contains(&d("late.example")));
}

#[tokio::test]
async fn test_full_queue_drops_are_counted() {
    // 容量 = 1 × 2
    let settings = test_settings(1, 2);
    let probes: Vec<ProbeDefinition> = settings.probes();
    let counters = Arc::new(ScanCounters::new(&probes));
    let sinks = MemorySinks::new(&probes);
    let mut scanner = Scanner::with_components(
        settings,
        counters,
        ScannerComponents {
            engine: Arc::new(MockEngine::new()),
            expander: Arc::new(StaticProvider::new()),
            feed: None,
            sinks: sinks.sink_set(),
        },
    );

    assert_eq!(scanner.seed(["a.example", "b.example", "c.example"]), 2);
    assert_eq!(scanner.gate().queue().len(), 2);

    let snapshot = scanner.shutdown().await;
    assert_eq!(snapshot.dropped, 1);
    assert_eq!(snapshot.scanned, 0);
}

#[tokio::test]
async fn test_invalid_seeds_are_skipped() {
    let h = harness(MockEngine::new(), StaticProvider::new(), 1);

    assert_eq!(h.scanner.seed(["", "bad domain", "Good.Example."]), 1);
    assert!(h.scanner.gate().dedup().contains(&d("good.example")));
}

#[tokio::test]
async fn test_run_until_seeds_from_settings() {
    let mut h = harness(MockEngine::new(), StaticProvider::new(), 1);

    let counters = h.scanner.counters().clone();
    let signal = async move {
        wait_until(|| counters.scanned() == 1, Duration::from_secs(5)).await;
    };
    let snapshot = h.scanner.run_until(signal).await;

    assert_eq!(snapshot.scanned, 1);
    assert_eq!(h.sinks.domain_log.lines(), vec!["example.com"]);
}
