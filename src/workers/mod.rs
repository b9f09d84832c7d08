// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供扫描 worker、证书流订阅、去重过期清理、进度报告
/// 以及负责优雅关闭的工作器管理器
pub mod expiration_worker;
pub mod manager;
pub mod progress_worker;
pub mod scan_worker;
pub mod stream_worker;
pub mod worker;

pub use manager::{shutdown_signal, WorkerManager};
pub use worker::Worker;
