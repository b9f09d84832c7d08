// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 域名（domain_name）：规范化后的主机名，流水线中流转的唯一数据单元
/// - 探测规则（probe）：暴露面探测规则与请求协议
pub mod domain_name;
pub mod probe;

pub use domain_name::{Domain, DomainError};
pub use probe::{ProbeDefinition, Scheme};
