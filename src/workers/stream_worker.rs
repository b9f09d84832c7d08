// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::infrastructure::stream::{parse_event, FeedConnector, FeedEvent, StreamError};
use crate::queue::AdmissionGate;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 订阅连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StreamState::Disconnected => write!(f, "disconnected"),
            StreamState::Connecting => write!(f, "connecting"),
            StreamState::Connected => write!(f, "connected"),
        }
    }
}

/// 实时发现源订阅工作器
///
/// 状态机：Disconnected → Connecting → Connected →（读错误或连接结束）Disconnected。
/// 连接失败或断开后等待 `reconnect_delay` 再重连，永不主动退出。
/// 已连接时超过 `idle_timeout` 收不到消息即按读错误断开。
/// 收到的域名走与扫描 worker 相同的准入路径。
pub struct StreamWorker {
    connector: Arc<dyn FeedConnector>,
    gate: AdmissionGate,
    reconnect_delay: Duration,
    idle_timeout: Duration,
    state: watch::Sender<StreamState>,
}

impl StreamWorker {
    pub fn new(
        connector: Arc<dyn FeedConnector>,
        gate: AdmissionGate,
        reconnect_delay: Duration,
        idle_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(StreamState::Disconnected);
        Self {
            connector,
            gate,
            reconnect_delay,
            idle_timeout,
            state,
        }
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    fn transition(&self, next: StreamState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!("[Certstream] {} -> {}", previous, next);
        }
    }

    /// 处理一条原始消息，返回成功入队的域名数
    pub fn handle_message(&self, raw: &str) -> usize {
        match parse_event(raw) {
            FeedEvent::Discovery(domains) => self.gate.admit_all(domains),
            FeedEvent::Ignored => 0,
            FeedEvent::Malformed => {
                self.gate.counters().record_malformed();
                0
            }
        }
    }

    /// 单次连接周期：连接、读取直至断开
    async fn connect_once(&self) {
        self.transition(StreamState::Connecting);

        let mut stream = match self.connector.connect().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(
                    "[Certstream] Connect to {} failed: {}",
                    self.connector.endpoint(),
                    e
                );
                self.transition(StreamState::Disconnected);
                return;
            }
        };

        self.transition(StreamState::Connected);
        info!("[Certstream] Subscribed to {}", self.connector.endpoint());

        loop {
            let item = match tokio::time::timeout(self.idle_timeout, stream.next()).await {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(_) => Err(StreamError::Read(format!(
                    "no message for {:?}",
                    self.idle_timeout
                ))),
            };
            match item {
                Ok(raw) => {
                    self.handle_message(&raw);
                }
                Err(e) => {
                    warn!("[Certstream] Connection lost: {}", e);
                    break;
                }
            }
        }

        self.transition(StreamState::Disconnected);
    }
}

#[async_trait]
impl Worker for StreamWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        loop {
            self.connect_once().await;
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    fn name(&self) -> &str {
        "stream-worker"
    }
}

#[cfg(test)]
#[path = "stream_worker_test.rs"]
mod tests;
