// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use crate::domain::models::Domain;
use crate::infrastructure::cache::DedupCache;
use crate::infrastructure::metrics::ScanCounters;
use crate::queue::task_queue::BoundedTaskQueue;

/// 准入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// 新域名，已入队
    Admitted,
    /// 去重窗口内已出现过
    Duplicate,
    /// 队列已满或已关闭，任务被丢弃
    Dropped,
}

/// 准入路径：去重检查后非阻塞入队
///
/// 种子、worker 发现的子域名与证书流共用同一条准入路径。
#[derive(Clone)]
pub struct AdmissionGate {
    dedup: Arc<DedupCache>,
    queue: Arc<BoundedTaskQueue>,
    counters: Arc<ScanCounters>,
}

impl AdmissionGate {
    pub fn new(
        dedup: Arc<DedupCache>,
        queue: Arc<BoundedTaskQueue>,
        counters: Arc<ScanCounters>,
    ) -> Self {
        Self {
            dedup,
            queue,
            counters,
        }
    }

    /// 尝试让域名进入流水线
    ///
    /// 队列关闭后直接拒绝，不写入去重缓存。队列已满时域名仍留在去重缓存中，
    /// 直到过期前都不会被再次准入。
    pub fn admit(&self, domain: Domain) -> Admission {
        if self.queue.is_closed() {
            self.counters.record_dropped();
            return Admission::Dropped;
        }
        if self.dedup.admit(&domain) {
            return Admission::Duplicate;
        }
        if self.queue.try_push(domain) {
            Admission::Admitted
        } else {
            self.counters.record_dropped();
            Admission::Dropped
        }
    }

    /// 批量准入，返回成功入队的数量
    pub fn admit_all<I>(&self, domains: I) -> usize
    where
        I: IntoIterator<Item = Domain>,
    {
        domains
            .into_iter()
            .filter(|domain| self.admit(domain.clone()) == Admission::Admitted)
            .count()
    }

    pub fn dedup(&self) -> &Arc<DedupCache> {
        &self.dedup
    }

    pub fn queue(&self) -> &Arc<BoundedTaskQueue> {
        &self.queue
    }

    pub fn counters(&self) -> &Arc<ScanCounters> {
        &self.counters
    }
}
