// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::infrastructure::metrics::{CounterSnapshot, ScanCounters};
use crate::queue::BoundedTaskQueue;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 渲染单行状态，以 `\r` 开头以便原地覆盖
pub fn render_status(snapshot: &CounterSnapshot, queue_len: usize, capacity: usize) -> String {
    format!(
        "\rScanned: {} | Matches: {} | Subdomains: {} | Queue: {}/{}",
        snapshot.scanned,
        snapshot.total_matches(),
        snapshot.discovered,
        queue_len,
        capacity
    )
}

/// 进度报告工作器
///
/// 只读取计数器与队列占用，不影响流水线
pub struct ProgressWorker {
    counters: Arc<ScanCounters>,
    queue: Arc<BoundedTaskQueue>,
    interval: Duration,
}

impl ProgressWorker {
    pub fn new(counters: Arc<ScanCounters>, queue: Arc<BoundedTaskQueue>, interval: Duration) -> Self {
        Self {
            counters,
            queue,
            interval,
        }
    }

    /// 当前状态行
    pub fn status_line(&self) -> String {
        let depth = self.queue.len();
        self.counters.record_queue_depth(depth);
        render_status(&self.counters.snapshot(), depth, self.queue.capacity())
    }

    fn emit(&self) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(self.status_line().as_bytes())?;
        stdout.flush()
    }
}

#[async_trait]
impl Worker for ProgressWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.emit()?;
        }
    }

    fn name(&self) -> &str {
        "progress-worker"
    }
}
