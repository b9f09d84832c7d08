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

use certsweep::application::Scanner;
use certsweep::config::settings::Settings;
use certsweep::infrastructure::metrics;
use certsweep::utils::telemetry;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并运行扫描器直到收到关闭信号
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting certsweep...");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Prometheus metrics
    if settings.metrics.enabled {
        metrics::init_metrics(settings.metrics_addr()?)?;
    }

    // 4. Run until SIGINT / SIGTERM
    let mut scanner = Scanner::connect(settings).await?;
    scanner.run().await;

    println!("Shutdown complete");
    Ok(())
}
