// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    config::settings::Settings,
    domain::{
        models::{Domain, ProbeDefinition},
        services::probe_service::ProbeService,
    },
    engines::{
        reqwest_engine::ReqwestEngine,
        traits::{EngineError, HttpEngine},
    },
    infrastructure::{
        cache::DedupCache,
        expansion::{DisabledSubdomainProvider, HttpSubdomainProvider, SubdomainProvider},
        metrics::{CounterSnapshot, ScanCounters},
        storage::SinkSet,
        stream::{CertstreamConnector, FeedConnector},
    },
    queue::{AdmissionGate, BoundedTaskQueue},
    workers::{
        expiration_worker::ExpirationWorker,
        manager::{shutdown_signal, WorkerManager},
        progress_worker::{render_status, ProgressWorker},
        scan_worker::ScanContext,
        stream_worker::{StreamState, StreamWorker},
    },
};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("HTTP engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Invalid expansion endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// 扫描器的外部依赖，测试中可替换为内存实现
pub struct ScannerComponents {
    pub engine: Arc<dyn HttpEngine>,
    pub expander: Arc<dyn SubdomainProvider>,
    pub feed: Option<Arc<dyn FeedConnector>>,
    pub sinks: SinkSet,
}

/// 扫描器
///
/// 组装准入路径、worker 池与后台任务，并负责启动与优雅关闭。
pub struct Scanner {
    settings: Settings,
    probes: Arc<[ProbeDefinition]>,
    gate: AdmissionGate,
    components: ScannerComponents,
    manager: Option<WorkerManager>,
    stream_state: Option<watch::Receiver<StreamState>>,
}

impl Scanner {
    /// 按配置创建真实的网络依赖与文件输出
    pub async fn connect(settings: Settings) -> Result<Self, ScannerError> {
        let probes = settings.probes();
        let counters = Arc::new(ScanCounters::new(&probes));

        let engine = ReqwestEngine::new(&settings.scanner.user_agent, settings.request_timeout())?;

        let expander: Arc<dyn SubdomainProvider> = if settings.expansion.enabled {
            Arc::new(HttpSubdomainProvider::new(
                engine.client().clone(),
                &settings.expansion.endpoint,
                settings.request_timeout(),
                counters.clone(),
            )?)
        } else {
            Arc::new(DisabledSubdomainProvider)
        };

        let feed: Option<Arc<dyn FeedConnector>> = if settings.stream.enabled {
            Some(Arc::new(CertstreamConnector::new(
                settings.stream.url.clone(),
                settings.stream_connect_timeout(),
            )))
        } else {
            None
        };

        let sinks = SinkSet::open(&settings.output, &probes).await;

        Ok(Self::with_components(
            settings,
            counters,
            ScannerComponents {
                engine: Arc::new(engine),
                expander,
                feed,
                sinks,
            },
        ))
    }

    pub fn with_components(
        settings: Settings,
        counters: Arc<ScanCounters>,
        components: ScannerComponents,
    ) -> Self {
        let probes: Arc<[ProbeDefinition]> = settings.probes().into();
        let gate = AdmissionGate::new(
            Arc::new(DedupCache::new()),
            Arc::new(BoundedTaskQueue::new(settings.queue_capacity())),
            counters,
        );

        Self {
            settings,
            probes,
            gate,
            components,
            manager: None,
            stream_state: None,
        }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn counters(&self) -> &Arc<ScanCounters> {
        self.gate.counters()
    }

    /// 证书流连接状态，未启用证书流或尚未启动时为 `None`
    pub fn stream_state(&self) -> Option<watch::Receiver<StreamState>> {
        self.stream_state.clone()
    }

    /// 通过准入路径注入域名，无效域名被跳过
    pub fn seed<'a, I>(&self, domains: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let valid = domains.into_iter().filter_map(|raw| match Domain::parse(raw) {
            Ok(domain) => Some(domain),
            Err(e) => {
                warn!("Skipping seed {:?}: {}", raw, e);
                None
            }
        });
        self.gate.admit_all(valid)
    }

    pub fn seed_from_settings(&self) -> usize {
        let seeds = self.settings.scanner.seeds.clone();
        let admitted = self.seed(seeds.iter().map(String::as_str));
        info!("Seeded {} of {} domains", admitted, seeds.len());
        admitted
    }

    /// 启动 worker 池与后台任务，重复调用无效
    pub fn start(&mut self) {
        if self.manager.is_some() {
            return;
        }

        let context = ScanContext {
            gate: self.gate.clone(),
            expander: self.components.expander.clone(),
            prober: Arc::new(ProbeService::new(
                self.components.engine.clone(),
                self.settings.request_timeout(),
            )),
            probes: self.probes.clone(),
            sinks: self.components.sinks.clone(),
        };

        let mut manager = WorkerManager::new(context);
        manager.start_workers(self.settings.scanner.workers);

        manager.spawn_background(Arc::new(ExpirationWorker::new(
            self.gate.dedup().clone(),
            self.settings.purge_interval(),
            self.settings.dedup_expiry(),
        )));

        if let Some(feed) = &self.components.feed {
            let worker = StreamWorker::new(
                feed.clone(),
                self.gate.clone(),
                self.settings.reconnect_delay(),
                self.settings.stream_idle_timeout(),
            );
            self.stream_state = Some(worker.subscribe());
            manager.spawn_background(Arc::new(worker));
        }

        if self.settings.progress.enabled {
            manager.spawn_background(Arc::new(ProgressWorker::new(
                self.gate.counters().clone(),
                self.gate.queue().clone(),
                self.settings.progress_interval(),
            )));
        }

        info!(
            "Scanner started: {} workers, queue capacity {}",
            manager.worker_count(),
            self.gate.queue().capacity()
        );
        self.manager = Some(manager);
    }

    /// 优雅关闭并返回最终计数
    pub async fn shutdown(&mut self) -> CounterSnapshot {
        match self.manager.take() {
            Some(mut manager) => manager.shutdown().await,
            None => {
                self.gate.queue().close();
                self.components.sinks.flush_all().await;
                self.components.sinks.close_all().await;
            }
        }

        let snapshot = self.gate.counters().snapshot();
        if self.settings.progress.enabled {
            println!(
                "{}",
                render_status(&snapshot, self.gate.queue().len(), self.gate.queue().capacity())
            );
        }
        info!(
            scanned = snapshot.scanned,
            matches = snapshot.total_matches(),
            dropped = snapshot.dropped,
            malformed = snapshot.malformed,
            "Scan finished"
        );
        snapshot
    }

    /// 注入种子、启动，等待给定信号后优雅关闭
    pub async fn run_until<F>(&mut self, signal: F) -> CounterSnapshot
    where
        F: Future<Output = ()>,
    {
        self.seed_from_settings();
        self.start();
        signal.await;
        self.shutdown().await
    }

    /// 运行直到收到 SIGINT 或 SIGTERM
    pub async fn run(&mut self) -> CounterSnapshot {
        self.run_until(shutdown_signal()).await
    }
}
