// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::models::{Domain, ProbeDefinition, Scheme};
use crate::engines::traits::{FetchRequest, HttpEngine};

/// 探测服务
///
/// 对单个域名执行一条探测规则：依次尝试 https 与 http，
/// 返回第一个命中的URL。网络错误、非 200 状态、Content-Type 不符
/// 都只视为本次尝试未命中。
pub struct ProbeService {
    engine: Arc<dyn HttpEngine>,
    timeout: Duration,
}

impl ProbeService {
    pub fn new(engine: Arc<dyn HttpEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// 执行探测
    ///
    /// # 返回值
    ///
    /// * `Some(url)` - 第一个命中的URL，之后不再尝试其他协议
    /// * `None` - 所有协议均未命中
    #[instrument(skip(self, domain, probe), fields(domain = %domain, probe = %probe.id))]
    pub async fn probe(&self, domain: &Domain, probe: &ProbeDefinition) -> Option<String> {
        for scheme in Scheme::FALLBACK_ORDER {
            let url = probe.url_for(scheme, domain);
            if self.attempt(&url, probe).await {
                debug!(%url, "Probe matched");
                return Some(url);
            }
        }
        None
    }

    async fn attempt(&self, url: &str, probe: &ProbeDefinition) -> bool {
        let request = FetchRequest::new(url, self.timeout);
        let response = match self.engine.fetch(&request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, transient = e.is_transient(), error = %e, "Probe attempt failed");
                return false;
            }
        };

        if response.status_code() != 200 {
            return false;
        }
        if !probe.accepts_content_type(response.content_type()) {
            return false;
        }

        match response.text().await {
            Ok(body) => body.contains(probe.keyword.as_str()),
            Err(e) => {
                debug!(%url, error = %e, "Failed to read probe body");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "probe_service_test.rs"]
mod tests;
