// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::cache::DedupCache;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// 去重缓存过期清理工作器
///
/// 每隔 `interval` 删除超过 `expiry` 的去重记录，使域名可以被重新扫描
pub struct ExpirationWorker {
    cache: Arc<DedupCache>,
    interval: Duration,
    expiry: Duration,
}

impl ExpirationWorker {
    pub fn new(cache: Arc<DedupCache>, interval: Duration, expiry: Duration) -> Self {
        Self {
            cache,
            interval,
            expiry,
        }
    }

    /// 执行一次清理
    pub fn purge_once(&self) -> usize {
        let removed = self.cache.purge(self.expiry);
        if removed > 0 {
            info!("Purged {} expired dedup entries", removed);
        } else {
            debug!("No expired dedup entries");
        }
        removed
    }
}

#[async_trait]
impl Worker for ExpirationWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Dedup expiration worker started");

        // 首次清理在一个完整间隔之后
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.purge_once();
        }
    }

    fn name(&self) -> &str {
        "expiration-worker"
    }
}

#[cfg(test)]
#[path = "expiration_worker_test.rs"]
mod tests;
