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

use crate::engines::traits::{EngineError, EngineResponse, FetchRequest, HttpEngine};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const MAX_IDLE_PER_HOST: usize = 100;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// 抓取引擎
///
/// 基于reqwest实现的HTTP探测引擎。所有 worker 共享同一个带连接池的客户端。
#[derive(Clone)]
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    /// 创建引擎实例
    ///
    /// # 参数
    ///
    /// * `user_agent` - 请求携带的 User-Agent
    /// * `timeout` - 客户端级别的默认超时
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// 底层客户端，供子域名扩展等组件复用连接池
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

struct ReqwestResponse {
    status_code: u16,
    content_type: Option<String>,
    inner: reqwest::Response,
}

#[async_trait]
impl EngineResponse for ReqwestResponse {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn text(self: Box<Self>) -> Result<String, EngineError> {
        Ok(self.inner.text().await?)
    }
}

#[async_trait]
impl HttpEngine for ReqwestEngine {
    /// 执行HTTP请求，仅读取响应头
    ///
    /// # 参数
    ///
    /// * `request` - 探测请求
    ///
    /// # 返回值
    ///
    /// * `Ok(Box<dyn EngineResponse>)` - 已收到响应头的响应
    /// * `Err(EngineError)` - 连接、TLS、DNS 或超时错误
    async fn fetch(&self, request: &FetchRequest) -> Result<Box<dyn EngineResponse>, EngineError> {
        let response = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout
                } else {
                    EngineError::RequestFailed(e)
                }
            })?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Box::new(ReqwestResponse {
            status_code: response.status().as_u16(),
            content_type,
            inner: response,
        }))
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
