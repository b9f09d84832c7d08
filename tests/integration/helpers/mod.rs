// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod mock_engine;
pub mod mock_feed;

use certsweep::config::settings::Settings;
use certsweep::domain::models::{Domain, ProbeDefinition};
use certsweep::domain::repositories::sink_repository::LineSink;
use certsweep::infrastructure::storage::{InMemorySink, SinkSet};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use mock_engine::MockEngine;
pub use mock_feed::{certificate_update, ScriptedFeed};
pub use mock_provider::StaticProvider;

pub fn d(s: &str) -> Domain {
    Domain::parse(s).unwrap()
}

/// 测试配置：少量 worker、关闭证书流与进度输出
pub fn test_settings(workers: usize, buffer_factor: usize) -> Settings {
    let workers = workers.to_string();
    let buffer_factor = buffer_factor.to_string();
    Settings::with_overrides(&[
        ("scanner.workers", workers.as_str()),
        ("scanner.queue_buffer_factor", buffer_factor.as_str()),
        ("scanner.request_timeout_secs", "1"),
        ("stream.enabled", "false"),
        ("progress.enabled", "false"),
    ])
    .unwrap()
}

/// 每个探测规则一个内存输出，外加一个域名日志
pub struct MemorySinks {
    pub domain_log: Arc<InMemorySink>,
    pub probes: HashMap<String, Arc<InMemorySink>>,
}

impl MemorySinks {
    pub fn new(probes: &[ProbeDefinition]) -> Self {
        Self {
            domain_log: Arc::new(InMemorySink::new("domain_log")),
            probes: probes
                .iter()
                .map(|p| (p.id.clone(), Arc::new(InMemorySink::new(p.id.clone()))))
                .collect(),
        }
    }

    pub fn sink_set(&self) -> SinkSet {
        let domain_log: Arc<dyn LineSink> = self.domain_log.clone();
        SinkSet::new(
            Some(domain_log),
            self.probes
                .iter()
                .map(|(id, sink)| {
                    let sink: Arc<dyn LineSink> = sink.clone();
                    (id.clone(), sink)
                })
                .collect(),
        )
    }

    pub fn probe_lines(&self, probe_id: &str) -> Vec<String> {
        self.probes[probe_id].lines()
    }
}

/// 轮询直到条件满足或超时
pub async fn wait_until<F>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let poll = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(timeout, poll).await.is_ok()
}
