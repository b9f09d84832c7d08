// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::models::ProbeDefinition;

/// 应用程序配置设置
///
/// 包含扫描器、去重、子域名扩展、证书流、输出、进度与指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 扫描器配置
    pub scanner: ScannerSettings,
    /// 去重缓存配置
    pub dedup: DedupSettings,
    /// 子域名扩展配置
    pub expansion: ExpansionSettings,
    /// 证书流配置
    pub stream: StreamSettings,
    /// 输出配置
    pub output: OutputSettings,
    /// 进度显示配置
    pub progress: ProgressSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 探测规则，为空时使用内置规则
    #[serde(default)]
    pub probes: Vec<ProbeDefinition>,
}

/// 扫描器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSettings {
    /// worker 数量
    pub workers: usize,
    /// 队列容量系数（容量 = workers × 系数）
    pub queue_buffer_factor: usize,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 请求 User-Agent
    pub user_agent: String,
    /// 启动时注入的种子域名
    pub seeds: Vec<String>,
}

/// 去重缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DedupSettings {
    /// 清理间隔（秒）
    pub purge_interval_secs: u64,
    /// 条目过期时间（秒）
    pub expiry_secs: u64,
}

/// 子域名扩展配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ExpansionSettings {
    /// 是否启用
    pub enabled: bool,
    /// 接口地址，域名作为 `domain` 查询参数传入
    pub endpoint: String,
}

/// 证书流配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSettings {
    /// 是否启用
    pub enabled: bool,
    /// WebSocket 地址
    pub url: String,
    /// 重连间隔（秒）
    pub reconnect_delay_secs: u64,
    /// WebSocket 握手超时（秒）
    pub connect_timeout_secs: u64,
    /// 连接上多久收不到任何消息即视为断开（秒）
    pub idle_timeout_secs: u64,
}

/// 输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// 域名日志路径
    pub domain_log: String,
    /// 探测结果根目录
    pub results_dir: String,
    /// 域名日志每写入多少行刷新一次
    pub domain_log_flush_every: usize,
}

/// 进度显示配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressSettings {
    /// 是否启用
    pub enabled: bool,
    /// 刷新间隔（毫秒）
    pub interval_ms: u64,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 以及 `CERTSWEEP__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CERTSWEEP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("scanner.seeds"),
            );

        Self::build(builder)
    }

    /// 仅使用内置默认值与给定覆盖项创建配置，不读取文件和环境变量
    pub fn with_overrides(overrides: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        Self::build(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Default scanner settings
            .set_default("scanner.workers", 300)?
            .set_default("scanner.queue_buffer_factor", 50)?
            .set_default("scanner.request_timeout_secs", 8)?
            .set_default("scanner.user_agent", "Mozilla/5.0")?
            .set_default("scanner.seeds", vec!["example.com"])?
            // Default dedup settings
            .set_default("dedup.purge_interval_secs", 2 * 60 * 60)?
            .set_default("dedup.expiry_secs", 24 * 60 * 60)?
            // Default expansion settings
            .set_default("expansion.enabled", true)?
            .set_default("expansion.endpoint", "https://api.example.com/")?
            // Default stream settings
            .set_default("stream.enabled", true)?
            .set_default("stream.url", "wss://certstream.calidog.io/")?
            .set_default("stream.reconnect_delay_secs", 5)?
            .set_default("stream.connect_timeout_secs", 45)?
            .set_default("stream.idle_timeout_secs", 60)?
            // Default output settings
            .set_default("output.domain_log", "domains/domains.txt")?
            .set_default("output.results_dir", ".")?
            .set_default("output.domain_log_flush_every", 1000)?
            // Default progress settings
            .set_default("progress.enabled", true)?
            .set_default("progress.interval_ms", 1000)?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.workers == 0 {
            return Err(ConfigError::Message("scanner.workers must be at least 1".into()));
        }
        if self.scanner.queue_buffer_factor == 0 {
            return Err(ConfigError::Message(
                "scanner.queue_buffer_factor must be at least 1".into(),
            ));
        }
        if self.scanner.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "scanner.request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.dedup.purge_interval_secs == 0 {
            return Err(ConfigError::Message(
                "dedup.purge_interval_secs must be at least 1".into(),
            ));
        }
        if self.stream.connect_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "stream.connect_timeout_secs must be at least 1".into(),
            ));
        }
        if self.stream.idle_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "stream.idle_timeout_secs must be at least 1".into(),
            ));
        }
        if self.progress.interval_ms == 0 {
            return Err(ConfigError::Message("progress.interval_ms must be at least 1".into()));
        }
        if self.metrics.enabled {
            self.metrics_addr()?;
        }
        if let Some(probe) = self.probes.iter().find(|p| !p.path.starts_with('/')) {
            return Err(ConfigError::Message(format!(
                "probe {} path must start with '/'",
                probe.id
            )));
        }
        Ok(())
    }

    /// 队列容量
    pub fn queue_capacity(&self) -> usize {
        self.scanner.workers.saturating_mul(self.scanner.queue_buffer_factor)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.scanner.request_timeout_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.dedup.purge_interval_secs)
    }

    pub fn dedup_expiry(&self) -> Duration {
        Duration::from_secs(self.dedup.expiry_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.stream.reconnect_delay_secs)
    }

    pub fn stream_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.stream.connect_timeout_secs)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream.idle_timeout_secs)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress.interval_ms)
    }

    /// 生效的探测规则
    pub fn probes(&self) -> Vec<ProbeDefinition> {
        if self.probes.is_empty() {
            ProbeDefinition::defaults()
        } else {
            self.probes.clone()
        }
    }

    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.metrics.listen_addr.parse().map_err(|e| {
            ConfigError::Message(format!(
                "invalid metrics.listen_addr {}: {}",
                self.metrics.listen_addr, e
            ))
        })
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
