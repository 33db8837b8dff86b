//! Configuration management for the screening pipeline

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Prefix for environment overrides, e.g. `SCREENING__MODEL__PATH`
pub const ENV_PREFIX: &str = "SCREENING";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub assessment: AssessmentConfig,
    pub logging: LoggingConfig,
}

/// Model artifact and runtime configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file
    pub path: String,
    /// Number of intra-op threads for ONNX Runtime (default: 1)
    pub intra_threads: usize,
    /// Upper bound for a model load, in milliseconds
    pub load_timeout_ms: Option<u64>,
    /// Upper bound for one forward pass, in milliseconds
    pub inference_timeout_ms: Option<u64>,
}

impl ModelConfig {
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }

    pub fn inference_timeout(&self) -> Option<Duration> {
        self.inference_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "model.onnx".to_string(),
            intra_threads: 1,
            load_timeout_ms: None,
            inference_timeout_ms: None,
        }
    }
}

/// Result interpretation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Scores strictly above this are positive
    pub threshold: f64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file plus environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path plus environment overrides.
    ///
    /// A missing file is not an error; every setting has a default.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.path, "model.onnx");
        assert_eq!(config.model.intra_threads, 1);
        assert_eq!(config.model.load_timeout(), None);
        assert_eq!(config.assessment.threshold, 0.5);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.model.path, "model.onnx");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "screening-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[model]\npath = \"models/pd.onnx\"\nload_timeout_ms = 5000\n\n[assessment]\nthreshold = 0.6\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.model.path, "models/pd.onnx");
        assert_eq!(config.model.load_timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(config.model.intra_threads, 1);
        assert_eq!(config.assessment.threshold, 0.6);
        assert_eq!(config.logging.level, "info");
    }
}
