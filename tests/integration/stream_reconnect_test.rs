// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    certificate_update, d, test_settings, MemorySinks, MockEngine, ScriptedFeed, StaticProvider,
};
use certsweep::application::{Scanner, ScannerComponents};
use certsweep::infrastructure::metrics::ScanCounters;
use certsweep::workers::stream_worker::StreamState;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_feed_events_admitted_after_reconnect() {
    let settings = test_settings(1, 8);
    let probes = settings.probes();
    let counters = Arc::new(ScanCounters::new(&probes));
    let sinks = MemorySinks::new(&probes);
    let feed = Arc::new(ScriptedFeed::new(
        1,
        vec![
            "{broken".to_string(),
            r#"{"message_type":"heartbeat"}"#.to_string(),
            certificate_update(&["*.feed.example", "www.feed.example"]),
        ],
    ));

    let mut scanner = Scanner::with_components(
        settings,
        counters,
        ScannerComponents {
            engine: Arc::new(MockEngine::new()),
            expander: Arc::new(StaticProvider::new()),
            feed: Some(feed.clone()),
            sinks: sinks.sink_set(),
        },
    );
    scanner.start();
    let state = scanner.stream_state().unwrap();

    // 第一次连接失败，等待重连间隔
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(feed.attempts(), 1);
    assert_eq!(*state.borrow(), StreamState::Disconnected);
    assert!(scanner.gate().dedup().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(feed.attempts(), 2);

    let dedup = scanner.gate().dedup();
    assert!(dedup.contains(&d("feed.example")));
    assert!(dedup.contains(&d("www.feed.example")));

    let snapshot = scanner.shutdown().await;
    assert_eq!(snapshot.scanned, 2);
    assert_eq!(snapshot.malformed, 1);
    assert_eq!(sinks.domain_log.lines().len(), 2);
}

#[tokio::test]
async fn test_stream_state_absent_when_disabled() {
    let settings = test_settings(1, 8);
    let probes = settings.probes();
    let sinks = MemorySinks::new(&probes);
    let mut scanner = Scanner::with_components(
        settings,
        Arc::new(ScanCounters::new(&probes)),
        ScannerComponents {
            engine: Arc::new(MockEngine::new()),
            expander: Arc::new(StaticProvider::new()),
            feed: None,
            sinks: sinks.sink_set(),
        },
    );

    scanner.start();
    assert!(scanner.stream_state().is_none());
    scanner.shutdown().await;
}
