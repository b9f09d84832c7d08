// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 组装流水线各组件并管理扫描器的生命周期
pub mod scanner;

pub use scanner::{Scanner, ScannerComponents, ScannerError};
