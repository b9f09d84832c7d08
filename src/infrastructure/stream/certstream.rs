// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::domain::models::Domain;

const DISCOVERY_MESSAGE_TYPE: &str = "certificate_update";
const ALL_DOMAINS_POINTER: &str = "/data/leaf_cert/all_domains";

/// 证书流错误类型
#[derive(Error, Debug)]
pub enum StreamError {
    /// 建立连接失败
    #[error("Connect failed: {0}")]
    Connect(String),
    /// 读取失败
    #[error("Read failed: {0}")]
    Read(String),
    /// 服务端关闭连接
    #[error("Connection closed by server")]
    Closed,
}

/// 已建立连接的事件流，每个元素是一条原始文本消息
pub type FeedStream = BoxStream<'static, Result<String, StreamError>>;

/// 实时发现源连接器
#[async_trait]
pub trait FeedConnector: Send + Sync {
    /// 建立一次新连接
    async fn connect(&self) -> Result<FeedStream, StreamError>;

    /// 连接地址，仅用于日志
    fn endpoint(&self) -> &str;
}

/// Certstream WebSocket 连接器
pub struct CertstreamConnector {
    url: String,
    connect_timeout: Duration,
}

impl CertstreamConnector {
    /// `connect_timeout` 限制 TCP 连接与 WebSocket 握手的总时长
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl FeedConnector for CertstreamConnector {
    async fn connect(&self) -> Result<FeedStream, StreamError> {
        let (ws_stream, _) =
            tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()))
                .await
                .map_err(|_| {
                    StreamError::Connect(format!(
                        "handshake timed out after {:?}",
                        self.connect_timeout
                    ))
                })?
                .map_err(|e| StreamError::Connect(e.to_string()))?;
        debug!("[Certstream] Connected to {}", self.url);

        let messages = ws_stream.filter_map(|item| async move {
            match item {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(data)) => Some(Ok(String::from_utf8_lossy(&data).into_owned())),
                Ok(Message::Close(_)) => Some(Err(StreamError::Closed)),
                // Ping/Pong
                Ok(_) => None,
                Err(e) => Some(Err(StreamError::Read(e.to_string()))),
            }
        });

        Ok(messages.boxed())
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// 单条事件的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// 证书更新事件携带的域名
    Discovery(Vec<Domain>),
    /// 合法 JSON，但不是域名发现事件
    Ignored,
    /// 无法解析为 JSON
    Malformed,
}

/// 解析一条 certstream 消息
///
/// 仅 `message_type == "certificate_update"` 且 `data.leaf_cert.all_domains`
/// 为数组的消息被视为发现事件；数组中的非字符串元素与非法域名被跳过。
pub fn parse_event(raw: &str) -> FeedEvent {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return FeedEvent::Malformed,
    };

    if value.get("message_type").and_then(Value::as_str) != Some(DISCOVERY_MESSAGE_TYPE) {
        return FeedEvent::Ignored;
    }

    match value.pointer(ALL_DOMAINS_POINTER).and_then(Value::as_array) {
        Some(entries) => FeedEvent::Discovery(
            entries
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|raw| Domain::parse(raw).ok())
                .collect(),
        ),
        None => FeedEvent::Ignored,
    }
}
