//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are merged with the
//! `config` crate in increasing precedence: defaults, base TOML file,
//! environment TOML file, `SUBMIT_*` environment variables.

use super::error::{ConfigResult, ConfigurationError};
use super::SubmitConfig;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_CONFIG_FILE: &str = "submit-config.toml";

/// Loaded configuration plus the context it was loaded from
#[derive(Debug)]
pub struct ConfigManager {
    config: SubmitConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            config_directory = %config_directory.display(),
            "Loading submission configuration"
        );

        let config = Self::load_layered(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = %environment,
            worker_id = %config.worker.worker_id,
            max_batch_size = config.batching.max_batch_size,
            batch_timeout_ms = config.batching.batch_timeout_ms,
            submit_enabled = config.filing_authority.submit_enabled,
            "🔧 Configuration loaded successfully"
        );
        debug!(
            config = %Self::sanitize_config_for_logging(&config),
            "Effective configuration"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration (composition roots and tests)
    pub fn from_config(config: SubmitConfig, environment: &str) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: Self::default_config_directory(),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    /// Get sanitized configuration for debugging/logging with credentials masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn load_layered(config_directory: &Path, environment: &str) -> ConfigResult<SubmitConfig> {
        let defaults = config::Config::try_from(&SubmitConfig::default())
            .map_err(|e| ConfigurationError::load_error("defaults", e))?;
        let base_file = config_directory.join(BASE_CONFIG_FILE);
        let env_file = config_directory.join(format!("submit-config.{environment}.toml"));

        let merged = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(base_file.clone()).required(false))
            .add_source(config::File::from(env_file.clone()).required(false))
            .add_source(
                config::Environment::with_prefix("SUBMIT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::load_error(base_file.display().to_string(), e))?;

        debug!(
            base_file = %base_file.display(),
            env_file = %env_file.display(),
            "Configuration sources merged"
        );

        Ok(merged.try_deserialize::<SubmitConfig>()?)
    }

    /// Mask credential-like fields so configuration can be logged safely
    fn sanitize_config_for_logging(config: &SubmitConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["session", "secret", "token", "password", "credential"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        *val = match val {
                            serde_json::Value::String(s) if s.is_empty() => {
                                serde_json::Value::String("[EMPTY]".to_string())
                            }
                            _ => serde_json::Value::String("[MASKED]".to_string()),
                        };
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }

    /// Detect current environment from environment variables
    fn detect_environment() -> String {
        env::var("SUBMIT_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        env::var("SUBMIT_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
