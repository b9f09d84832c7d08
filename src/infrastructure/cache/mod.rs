// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 提供流水线准入阶段使用的时间窗口去重缓存
pub mod dedup_cache;

pub use dedup_cache::DedupCache;
