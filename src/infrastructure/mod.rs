// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 缓存（cache）：时间窗口去重缓存
/// - 子域名扩展（expansion）：HTTP 子域名查询接口
/// - 指标（metrics）：共享计数器与 Prometheus 导出
/// - 存储（storage）：域名日志与探测结果输出
/// - 实时发现源（stream）：certstream 订阅
pub mod cache;
pub mod expansion;
pub mod metrics;
pub mod storage;
pub mod stream;
