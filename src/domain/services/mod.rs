// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 探测服务（probe_service）：按协议回退顺序执行单条探测规则
pub mod probe_service;
