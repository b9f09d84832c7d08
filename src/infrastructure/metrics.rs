// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::domain::models::ProbeDefinition;

pub const SCANNED_TOTAL: &str = "certsweep_domains_scanned_total";
pub const DISCOVERED_TOTAL: &str = "certsweep_subdomains_discovered_total";
pub const MATCHES_TOTAL: &str = "certsweep_probe_matches_total";
pub const DROPPED_TOTAL: &str = "certsweep_admissions_dropped_total";
pub const MALFORMED_TOTAL: &str = "certsweep_payloads_malformed_total";
pub const QUEUE_DEPTH: &str = "certsweep_queue_depth";

/// 安装 Prometheus 导出器并注册指标描述
///
/// 未调用时所有 `metrics` 宏都是空操作，进程内计数器照常工作。
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(SCANNED_TOTAL, "Total number of domains dequeued and scanned");
    describe_counter!(
        DISCOVERED_TOTAL,
        "Total number of subdomains returned by the expansion provider"
    );
    describe_counter!(MATCHES_TOTAL, "Total number of probe matches, by probe");
    describe_counter!(
        DROPPED_TOTAL,
        "Total number of domains dropped because the queue was full or closed"
    );
    describe_counter!(
        MALFORMED_TOTAL,
        "Total number of expansion payloads and feed events that failed to parse"
    );
    describe_gauge!(QUEUE_DEPTH, "Current number of domains waiting in the queue");

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

#[derive(Debug)]
struct ProbeCounter {
    id: String,
    count: AtomicU64,
}

/// 流水线共享计数器
///
/// 所有计数单调递增，由 worker 与后台任务并发更新。
#[derive(Debug)]
pub struct ScanCounters {
    scanned: AtomicU64,
    discovered: AtomicU64,
    dropped: AtomicU64,
    malformed: AtomicU64,
    matches: Vec<ProbeCounter>,
}

/// 计数器快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub scanned: u64,
    pub discovered: u64,
    pub dropped: u64,
    pub malformed: u64,
    /// 按探测规则声明顺序排列的命中数
    pub matches: Vec<(String, u64)>,
}

impl CounterSnapshot {
    pub fn total_matches(&self) -> u64 {
        self.matches.iter().map(|(_, count)| count).sum()
    }

    pub fn matches_for(&self, probe_id: &str) -> Option<u64> {
        self.matches
            .iter()
            .find(|(id, _)| id == probe_id)
            .map(|(_, count)| *count)
    }
}

impl ScanCounters {
    pub fn new(probes: &[ProbeDefinition]) -> Self {
        Self {
            scanned: AtomicU64::new(0),
            discovered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            matches: probes
                .iter()
                .map(|probe| ProbeCounter {
                    id: probe.id.clone(),
                    count: AtomicU64::new(0),
                })
                .collect(),
        }
    }

    pub fn record_scanned(&self) {
        self.scanned.fetch_add(1, Ordering::Relaxed);
        counter!(SCANNED_TOTAL).increment(1);
    }

    pub fn record_discovered(&self, count: usize) {
        if count == 0 {
            return;
        }
        self.discovered.fetch_add(count as u64, Ordering::Relaxed);
        counter!(DISCOVERED_TOTAL).increment(count as u64);
    }

    /// 记录一次命中，`probe_index` 为规则在探测集中的位置
    pub fn record_match(&self, probe_index: usize) {
        if let Some(probe) = self.matches.get(probe_index) {
            probe.count.fetch_add(1, Ordering::Relaxed);
            counter!(MATCHES_TOTAL, "probe" => probe.id.clone()).increment(1);
        }
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        counter!(DROPPED_TOTAL).increment(1);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
        counter!(MALFORMED_TOTAL).increment(1);
    }

    pub fn record_queue_depth(&self, depth: usize) {
        gauge!(QUEUE_DEPTH).set(depth as f64);
    }

    pub fn scanned(&self) -> u64 {
        self.scanned.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            scanned: self.scanned.load(Ordering::Relaxed),
            discovered: self.discovered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            matches: self
                .matches
                .iter()
                .map(|probe| (probe.id.clone(), probe.count.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}
