// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::domain::models::Domain;
use crate::infrastructure::metrics::ScanCounters;

/// 子域名扩展特质
///
/// 任何失败（网络错误、非 200 响应、无法解析的响应体）都返回空列表，
/// 不会中断流水线。
#[async_trait]
pub trait SubdomainProvider: Send + Sync {
    /// 查询与给定域名相关的子域名
    async fn expand(&self, domain: &Domain) -> Vec<Domain>;
}

#[derive(Debug, Default, Deserialize)]
struct ExpansionResponse {
    #[serde(default)]
    result: ExpansionResult,
}

#[derive(Debug, Default, Deserialize)]
struct ExpansionResult {
    #[serde(default)]
    domains: Vec<String>,
}

/// 基于 HTTP 接口的子域名扩展实现
///
/// 请求 `GET {endpoint}?domain={domain}`，响应格式为
/// `{"result": {"domains": ["..."]}}`。
pub struct HttpSubdomainProvider {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    counters: Arc<ScanCounters>,
}

impl HttpSubdomainProvider {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        timeout: Duration,
        counters: Arc<ScanCounters>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            timeout,
            counters,
        })
    }

    fn request_url(&self, domain: &Domain) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("domain", domain.as_str());
        url
    }
}

#[async_trait]
impl SubdomainProvider for HttpSubdomainProvider {
    #[instrument(skip(self, domain), fields(domain = %domain))]
    async fn expand(&self, domain: &Domain) -> Vec<Domain> {
        let response = match self
            .client
            .get(self.request_url(domain))
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Expansion request failed: {}", e);
                return Vec::new();
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            debug!("Expansion returned status {}", response.status());
            return Vec::new();
        }

        let raw = match response.bytes().await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Failed to read expansion body: {}", e);
                return Vec::new();
            }
        };

        let parsed: ExpansionResponse = match serde_json::from_slice(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.counters.record_malformed();
                debug!("Malformed expansion payload: {}", e);
                return Vec::new();
            }
        };

        parsed
            .result
            .domains
            .iter()
            .filter_map(|raw| Domain::parse(raw).ok())
            .collect()
    }
}

/// 扩展关闭时使用的空实现
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSubdomainProvider;

#[async_trait]
impl SubdomainProvider for DisabledSubdomainProvider {
    async fn expand(&self, _domain: &Domain) -> Vec<Domain> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "subdomain_client_test.rs"]
mod tests;
