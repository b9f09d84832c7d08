// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::sink_repository::SinkError;

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("输出错误: {0}")]
    Sink(#[from] SinkError),
}
