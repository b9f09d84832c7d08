// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::{d, wait_until, MemorySinks, MockEngine, StaticProvider};
use async_trait::async_trait;
use certsweep::domain::models::ProbeDefinition;
use certsweep::domain::services::probe_service::ProbeService;
use certsweep::infrastructure::cache::DedupCache;
use certsweep::infrastructure::metrics::ScanCounters;
use certsweep::queue::{AdmissionGate, BoundedTaskQueue};
use certsweep::utils::errors::WorkerError;
use certsweep::workers::scan_worker::ScanContext;
use certsweep::workers::{Worker, WorkerManager};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Forever {
    started: Arc<AtomicBool>,
}

#[async_trait]
impl Worker for Forever {
    async fn run(&self) -> Result<(), WorkerError> {
        self.started.store(true, Ordering::SeqCst);
        std::future::pending::<()>().await;
        Ok(())
    }

    fn name(&self) -> &str {
        "forever"
    }
}

fn context(capacity: usize, sinks: &MemorySinks) -> ScanContext {
    let probes = ProbeDefinition::defaults();
    let gate = AdmissionGate::new(
        Arc::new(DedupCache::new()),
        Arc::new(BoundedTaskQueue::new(capacity)),
        Arc::new(ScanCounters::new(&probes)),
    );
    ScanContext {
        gate,
        expander: Arc::new(StaticProvider::new()),
        prober: Arc::new(ProbeService::new(
            Arc::new(MockEngine::new()),
            Duration::from_secs(1),
        )),
        probes: probes.into(),
        sinks: sinks.sink_set(),
    }
}

#[tokio::test]
async fn test_shutdown_processes_every_queued_domain() {
    let sinks = MemorySinks::new(&ProbeDefinition::defaults());
    let ctx = context(16, &sinks);
    let gate = ctx.gate.clone();

    for i in 0..5 {
        gate.admit(d(&format!("host{}.example", i)));
    }

    let mut manager = WorkerManager::new(ctx);
    manager.start_workers(3);
    assert_eq!(manager.worker_count(), 3);

    manager.shutdown().await;

    assert_eq!(gate.counters().scanned(), 5);
    assert!(gate.queue().is_closed());
    assert_eq!(sinks.domain_log.lines().len(), 5);
    assert!(sinks.domain_log.is_closed());
}

#[tokio::test]
async fn test_shutdown_aborts_background_tasks() {
    let sinks = MemorySinks::new(&ProbeDefinition::defaults());
    let mut manager = WorkerManager::new(context(4, &sinks));
    let started = Arc::new(AtomicBool::new(false));

    manager.start_workers(1);
    manager.spawn_background(Arc::new(Forever {
        started: started.clone(),
    }));
    assert!(wait_until(|| started.load(Ordering::SeqCst), Duration::from_secs(5)).await);

    tokio::time::timeout(Duration::from_secs(5), manager.shutdown())
        .await
        .unwrap();
}
