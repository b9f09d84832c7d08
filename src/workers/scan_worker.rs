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

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::models::{Domain, ProbeDefinition};
use crate::domain::services::probe_service::ProbeService;
use crate::infrastructure::expansion::SubdomainProvider;
use crate::infrastructure::storage::SinkSet;
use crate::queue::AdmissionGate;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 扫描 worker 共享的依赖
#[derive(Clone)]
pub struct ScanContext {
    pub gate: AdmissionGate,
    pub expander: Arc<dyn SubdomainProvider>,
    pub prober: Arc<ProbeService>,
    pub probes: Arc<[ProbeDefinition]>,
    pub sinks: SinkSet,
}

/// 扫描工作者
///
/// 循环从队列取出域名：写入域名日志、扩展子域名并重新准入、
/// 按声明顺序执行全部探测规则，最后将已扫描计数加一。
/// 队列关闭并取空后退出。
pub struct ScanWorker {
    worker_id: usize,
    name: String,
    context: ScanContext,
}

impl ScanWorker {
    /// 创建新的扫描工作器实例
    pub fn new(worker_id: usize, context: ScanContext) -> Self {
        Self {
            worker_id,
            name: format!("scan-worker-{}", worker_id),
            context,
        }
    }

    /// 处理单个域名
    #[instrument(skip(self, domain), fields(worker = self.worker_id, domain = %domain))]
    pub async fn process(&self, domain: Domain) {
        let ctx = &self.context;
        ctx.sinks.record_domain(&domain).await;

        let subdomains = ctx.expander.expand(&domain).await;
        ctx.gate.counters().record_discovered(subdomains.len());
        let admitted = ctx.gate.admit_all(subdomains);
        if admitted > 0 {
            debug!(admitted, "Re-admitted discovered subdomains");
        }

        for (index, probe) in ctx.probes.iter().enumerate() {
            if let Some(url) = ctx.prober.probe(&domain, probe).await {
                ctx.gate.counters().record_match(index);
                ctx.sinks.record_match(&probe.id, &url).await;
                info!(probe = %probe.id, %url, "Exposure found");
            }
        }

        ctx.gate.counters().record_scanned();
    }
}

#[async_trait]
impl Worker for ScanWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        debug!("Scan worker {} started", self.worker_id);

        let queue = self.context.gate.queue().clone();
        while let Some(domain) = queue.pop().await {
            self.process(domain).await;
        }

        debug!("Scan worker {} drained", self.worker_id);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
