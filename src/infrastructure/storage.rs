// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::settings::OutputSettings;
use crate::domain::models::{Domain, ProbeDefinition};
use crate::domain::repositories::sink_repository::{LineSink, SinkError};

const WRITE_BUFFER_SIZE: usize = 4 * 1024;
const RESULT_FILE_NAME: &str = "domains_vulns.txt";

struct FileSinkState {
    writer: Option<BufWriter<File>>,
    pending: usize,
}

/// 本地文件输出实现
///
/// 以追加模式打开文件，写入经过缓冲，每累计 `flush_every` 行刷新一次。
pub struct FileSink {
    name: String,
    path: PathBuf,
    flush_every: usize,
    state: Mutex<FileSinkState>,
}

impl FileSink {
    /// 打开（必要时创建）输出文件及其父目录
    pub async fn open(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        flush_every: usize,
    ) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();

        // 确保目录存在
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            name: name.into(),
            path,
            flush_every: flush_every.max(1),
            state: Mutex::new(FileSinkState {
                writer: Some(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file)),
                pending: 0,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LineSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn append(&self, line: &str) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| SinkError::Closed(self.name.clone()))?;

        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        state.pending += 1;
        if state.pending >= self.flush_every {
            if let Some(writer) = state.writer.as_mut() {
                writer.flush().await?;
            }
            state.pending = 0;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        if let Some(writer) = state.writer.as_mut() {
            writer.flush().await?;
        }
        state.pending = 0;
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        if let Some(mut writer) = state.writer.take() {
            writer.flush().await?;
            writer.shutdown().await?;
        }
        state.pending = 0;
        Ok(())
    }
}

/// 测试用的内存输出实现（用于单元测试）
#[derive(Default)]
pub struct InMemorySink {
    name: String,
    lines: std::sync::Mutex<Vec<String>>,
    closed: std::sync::atomic::AtomicBool,
}

impl InMemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl LineSink for InMemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn append(&self, line: &str) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed(self.name.clone()));
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

/// 输出集合
///
/// 一个域名日志加上每条探测规则各自的结果输出。打开失败的输出被跳过，
/// 对应的写入变为空操作，流水线继续运行。
#[derive(Clone, Default)]
pub struct SinkSet {
    domain_log: Option<Arc<dyn LineSink>>,
    probes: HashMap<String, Arc<dyn LineSink>>,
}

impl SinkSet {
    pub fn new(
        domain_log: Option<Arc<dyn LineSink>>,
        probes: HashMap<String, Arc<dyn LineSink>>,
    ) -> Self {
        Self { domain_log, probes }
    }

    /// 按配置打开所有文件输出
    pub async fn open(settings: &OutputSettings, probes: &[ProbeDefinition]) -> Self {
        let domain_log = match FileSink::open(
            "domain_log",
            &settings.domain_log,
            settings.domain_log_flush_every,
        )
        .await
        {
            Ok(sink) => Some(Arc::new(sink) as Arc<dyn LineSink>),
            Err(e) => {
                warn!("Skipping domain log {}: {}", settings.domain_log, e);
                None
            }
        };

        let mut probe_sinks = HashMap::new();
        for probe in probes {
            let path = result_path(&settings.results_dir, probe);
            // Matches are rare; flush each one so nothing is lost on a crash.
            match FileSink::open(probe.id.clone(), &path, 1).await {
                Ok(sink) => {
                    probe_sinks.insert(probe.id.clone(), Arc::new(sink) as Arc<dyn LineSink>);
                }
                Err(e) => warn!("Skipping result sink {}: {}", path.display(), e),
            }
        }

        info!(
            probe_sinks = probe_sinks.len(),
            domain_log = domain_log.is_some(),
            "Output sinks opened"
        );
        Self::new(domain_log, probe_sinks)
    }

    /// 记录一个已出队的域名
    pub async fn record_domain(&self, domain: &Domain) {
        if let Some(sink) = &self.domain_log {
            if let Err(e) = sink.append(domain.as_str()).await {
                debug!("Failed to record domain {}: {}", domain, e);
            }
        }
    }

    /// 记录一条命中的URL
    pub async fn record_match(&self, probe_id: &str, url: &str) {
        if let Some(sink) = self.probes.get(probe_id) {
            if let Err(e) = sink.append(url).await {
                debug!("Failed to record match for {}: {}", probe_id, e);
            }
        }
    }

    pub async fn flush_all(&self) {
        for sink in self.all() {
            if let Err(e) = sink.flush().await {
                warn!("Failed to flush sink {}: {}", sink.name(), e);
            }
        }
    }

    /// 刷新并关闭所有输出
    pub async fn close_all(&self) {
        for sink in self.all() {
            if let Err(e) = sink.close().await {
                warn!("Failed to close sink {}: {}", sink.name(), e);
            }
        }
    }

    pub fn has_probe_sink(&self, probe_id: &str) -> bool {
        self.probes.contains_key(probe_id)
    }

    pub fn has_domain_log(&self) -> bool {
        self.domain_log.is_some()
    }

    fn all(&self) -> impl Iterator<Item = &Arc<dyn LineSink>> {
        self.domain_log.iter().chain(self.probes.values())
    }
}

/// 探测规则结果文件路径：`{results_dir}/vulnerable_{id}/domains_vulns.txt`
pub fn result_path(results_dir: &str, probe: &ProbeDefinition) -> PathBuf {
    Path::new(results_dir)
        .join(format!("vulnerable_{}", probe.id))
        .join(RESULT_FILE_NAME)
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
