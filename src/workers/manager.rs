// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::scan_worker::{ScanContext, ScanWorker};
use crate::workers::worker::Worker;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// 工作管理器
///
/// 持有扫描 worker 与后台任务的句柄，负责优雅关闭：
/// 关闭队列、等待 worker 取空队列、刷新并关闭输出，最后终止后台任务。
pub struct WorkerManager {
    context: ScanContext,
    handles: Vec<JoinHandle<()>>,
    background: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(context: ScanContext) -> Self {
        Self {
            context,
            handles: Vec::new(),
            background: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的扫描 worker
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker = ScanWorker::new(self.handles.len(), self.context.clone());
            self.handles.push(spawn_worker(Arc::new(worker)));
        }
        info!("Started {} scan workers", count);
    }

    /// 启动长期运行的后台任务，关闭时直接终止
    pub fn spawn_background(&mut self, worker: Arc<dyn Worker>) {
        debug!("Starting background task {}", worker.name());
        self.background.push(spawn_worker(worker));
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 优雅关闭
    ///
    /// 已入队的任务全部处理完成后才返回，不取消进行中的请求
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        self.context.gate.queue().close();

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Scan worker terminated abnormally: {}", e);
            }
        }

        self.context.sinks.flush_all().await;
        self.context.sinks.close_all().await;

        for handle in self.background.drain(..) {
            handle.abort();
        }

        info!("Workers shut down successfully");
    }
}

fn spawn_worker(worker: Arc<dyn Worker>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = worker.run().await {
            error!("Worker {} failed: {}", worker.name(), e);
        }
    })
}

/// 等待 SIGINT 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Unable to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
