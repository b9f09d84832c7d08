// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：域名、探测规则与结果
/// - 仓库接口（repositories）：结果输出抽象
/// - 服务（services）：探测执行逻辑
///
/// 领域层不依赖于任何具体的网络或存储实现。
pub mod models;
pub mod repositories;
pub mod services;
