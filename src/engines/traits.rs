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
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断是否为瞬时网络错误（超时或连接失败，含 DNS 与 TLS 握手）
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => e.is_timeout() || e.is_connect(),
            EngineError::Timeout => true,
            EngineError::Other(_) => false,
        }
    }
}

/// 探测请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 单次请求超时（包含读取响应体）
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

/// 已收到响应头、尚未读取响应体的响应
///
/// 探测逻辑先检查状态码与 Content-Type，只有结构上成功的响应才会读取响应体。
#[async_trait]
pub trait EngineResponse: Send {
    /// HTTP状态码
    fn status_code(&self) -> u16;

    /// 响应的 Content-Type 头
    fn content_type(&self) -> Option<&str>;

    /// 读取完整响应体
    async fn text(self: Box<Self>) -> Result<String, EngineError>;
}

/// HTTP 探测引擎特质
#[async_trait]
pub trait HttpEngine: Send + Sync {
    /// 发送 GET 请求
    async fn fetch(&self, request: &FetchRequest) -> Result<Box<dyn EngineResponse>, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
