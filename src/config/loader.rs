// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_LOG_LEVEL;
use crate::config::{validate_options, ProcessorOptions};
use crate::errors::ConfigurationError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration file for the conveyor binary.
///
/// # Fields
/// * `processor` - Pool tuning (concurrency, pacing, timeout, retry, error budget)
/// * `logging` - Log filter used when `RUST_LOG` is not set
///
/// # Example
/// ```yaml
/// processor:
///   concurrency: 4
///   delay_ms: 50
///   timeout_ms: 1000
///   max_retries: 2
///   retry_delay_ms: 100
///   max_total_errors: 3
/// logging:
///   level: debug
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub processor: ProcessorOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
///
/// `level` is any `tracing_subscriber::EnvFilter` directive, e.g. `info` or
/// `the_conveyor=debug,warn`.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Load a config from a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigurationError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match extension.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(ConfigurationError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load a config file and reject options no processor could run with.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigurationError> {
    let cfg = load_config(path)?;
    validate_options(&cfg.processor)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
processor:
  concurrency: 4
  delay_ms: 100
  max_retries: 2
logging:
  level: debug
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.processor.concurrency, 4);
        assert_eq!(cfg.processor.delay, Duration::from_millis(100));
        assert_eq!(cfg.processor.max_retries, 2);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_empty_sections_fall_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.processor, ProcessorOptions::default());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(
            ".yaml",
            "processor:\n  concurrency: 2\n  timeout_ms: 500\n",
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.processor.concurrency, 2);
        assert_eq!(cfg.processor.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_temp(
            ".toml",
            "[processor]\nconcurrency = 3\nretry_delay_ms = 75\nmax_total_errors = 5\n\n[logging]\nlevel = \"warn\"\n",
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.processor.concurrency, 3);
        assert_eq!(cfg.processor.retry_delay, Duration::from_millis(75));
        assert_eq!(cfg.processor.max_total_errors, Some(5));
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn test_load_and_validate_rejects_zero_concurrency() {
        let file = write_temp(".yml", "processor:\n  concurrency: 0\n");

        let error = load_and_validate_config(file.path()).unwrap_err();
        assert!(matches!(error, ConfigurationError::InvalidConcurrency { value: 0 }));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = write_temp(".json", "{}");

        let error = load_config(file.path()).unwrap_err();
        assert!(matches!(error, ConfigurationError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(error, ConfigurationError::Io { .. }));
        assert!(error.to_string().contains("/definitely/not/here.yaml"));
    }
}
