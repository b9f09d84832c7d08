// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::models::Domain;

/// 带时间窗口的去重缓存
///
/// 记录已经进入流水线的域名及其首次准入时间。分片的 `DashMap`
/// 保证大量 worker 并发调用 [`DedupCache::admit`] 时不会在同一把锁上串行。
/// 条目过期后由维护任务清除，同一域名即可再次准入。
#[derive(Debug, Default)]
pub struct DedupCache {
    entries: DashMap<Domain, Instant>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 原子地检查并记录域名
    ///
    /// # 返回值
    ///
    /// 域名此前已存在时返回 `true`；否则插入当前时间并返回 `false`。
    pub fn admit(&self, domain: &Domain) -> bool {
        self.admit_at(domain, Instant::now())
    }

    /// 以指定时间戳执行 [`DedupCache::admit`]
    pub fn admit_at(&self, domain: &Domain, now: Instant) -> bool {
        match self.entries.entry(domain.clone()) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert(now);
                false
            }
        }
    }

    /// 清除年龄超过 `older_than` 的条目，返回清除数量
    pub fn purge(&self, older_than: Duration) -> usize {
        self.purge_at(older_than, Instant::now())
    }

    /// 以指定的当前时间执行 [`DedupCache::purge`]
    ///
    /// 年龄恰好等于阈值的条目保留。
    pub fn purge_at(&self, older_than: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, admitted_at| now.saturating_duration_since(*admitted_at) <= older_than);
        let removed = before.saturating_sub(self.entries.len());
        debug!(removed, remaining = self.entries.len(), "Purged dedup cache");
        removed
    }

    pub fn contains(&self, domain: &Domain) -> bool {
        self.entries.contains_key(domain)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "dedup_cache_test.rs"]
mod tests;
