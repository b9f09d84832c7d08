// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 组装扫描流水线并管理其生命周期
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含域名与探测规则等核心类型以及探测服务
pub mod domain;

/// 引擎模块
///
/// 提供共享连接池的 HTTP 请求引擎
pub mod engines;

/// 基础设施模块
///
/// 提供去重缓存、子域名扩展、证书流、输出文件与指标等外部集成
pub mod infrastructure;

/// 队列模块
///
/// 实现固定容量任务队列与准入路径
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台任务处理和工作器管理
pub mod workers;
