// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置设置测试模块
///
/// 测试环境变量覆盖与配置校验

#[cfg(test)]
mod tests {
    use certsweep::config::settings::Settings;

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("CERTSWEEP__SCANNER__WORKERS", "12");
        std::env::set_var("CERTSWEEP__SCANNER__SEEDS", "a.example,b.example");
        std::env::set_var("CERTSWEEP__STREAM__ENABLED", "false");

        let settings = Settings::new();

        std::env::remove_var("CERTSWEEP__SCANNER__WORKERS");
        std::env::remove_var("CERTSWEEP__SCANNER__SEEDS");
        std::env::remove_var("CERTSWEEP__STREAM__ENABLED");

        let settings = settings.unwrap();
        assert_eq!(settings.scanner.workers, 12);
        assert_eq!(settings.queue_capacity(), 12 * 50);
        assert_eq!(settings.scanner.seeds, vec!["a.example", "b.example"]);
        assert!(!settings.stream.enabled);
        assert!(settings.expansion.enabled);
    }

    #[test]
    fn test_zero_buffer_factor_rejected() {
        let result = Settings::with_overrides(&[("scanner.queue_buffer_factor", "0")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_metrics_addr_rejected_only_when_enabled() {
        assert!(Settings::with_overrides(&[("metrics.listen_addr", "nowhere")]).is_ok());
        assert!(Settings::with_overrides(&[
            ("metrics.enabled", "true"),
            ("metrics.listen_addr", "nowhere"),
        ])
        .is_err());
    }
}
