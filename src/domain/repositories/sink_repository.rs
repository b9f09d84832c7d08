// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 输出错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 输出已关闭
    #[error("Sink closed: {0}")]
    Closed(String),
}

/// 追加式行输出特质
///
/// 每个探测规则一个输出，外加一个域名日志。实现负责串行化自身的写入，
/// 保证并发写入时不会出现交错的行。
#[async_trait]
pub trait LineSink: Send + Sync {
    /// 输出名称
    fn name(&self) -> &str;

    /// 追加一行（不含换行符）
    async fn append(&self, line: &str) -> Result<(), SinkError>;

    /// 将缓冲区内容刷新到底层存储
    async fn flush(&self) -> Result<(), SinkError>;

    /// 刷新并关闭，之后的追加返回 [`SinkError::Closed`]
    async fn close(&self) -> Result<(), SinkError>;
}
