//! # Submission Core Configuration
//!
//! Typed configuration for the batching, pipeline, and recovery components.
//! Values are layered by [`ConfigManager`]: built-in defaults, then
//! `config/submit-config.toml`, then an optional per-environment file, then
//! `SUBMIT_*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use submit_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let max_batch_size = manager.config().batching.max_batch_size;
//! let flush_every = manager.config().batching.batch_timeout();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring submit-config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmitConfig {
    /// Identity of this worker instance
    pub worker: WorkerConfig,

    /// Batch size and scheduling policy
    pub batching: BatchingConfig,

    /// Filing authority access switches and credentials
    pub filing_authority: FilingAuthorityConfig,

    /// Outbound notification switches
    pub messaging: MessagingConfig,

    /// Action executor settings
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker id; part of every batch path and the key for identity lookups
    pub worker_id: String,

    /// Batch-control year = current UTC year minus this offset
    pub batch_control_year_offset: i32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: "submit-worker-0".to_string(),
            batch_control_year_offset: 1,
        }
    }
}

impl WorkerConfig {
    /// Tax year that batches written at `now` belong to
    pub fn batch_control_year(&self, now: DateTime<Utc>) -> i32 {
        now.year() - self.batch_control_year_offset
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchingConfig {
    /// Submissions per batch before a size-triggered flush
    pub max_batch_size: usize,

    /// Fixed rate of the timeout flush
    pub batch_timeout_ms: u64,

    /// Fixed rate of unprocessed-batch reprocessing
    pub old_batch_interval_ms: u64,

    /// Fixed rate of error-batch polling
    pub error_polling_ms: u64,

    /// Delay before the first error poll
    pub error_polling_initial_delay_ms: u64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            batch_timeout_ms: 60_000,
            old_batch_interval_ms: 300_000,
            error_polling_ms: 60_000,
            error_polling_initial_delay_ms: 1_000,
        }
    }
}

impl BatchingConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    pub fn old_batch_interval(&self) -> Duration {
        Duration::from_millis(self.old_batch_interval_ms)
    }

    pub fn error_polling_interval(&self) -> Duration {
        Duration::from_millis(self.error_polling_ms)
    }

    pub fn error_polling_initial_delay(&self) -> Duration {
        Duration::from_millis(self.error_polling_initial_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilingAuthorityConfig {
    /// When false, SubmitBundle never contacts the authority and error polling is skipped
    pub submit_enabled: bool,

    /// Operational override that forces the offline path regardless of breaker state
    pub force_offline: bool,

    /// Default application session id, replaced by a per-worker override when one exists
    pub session_id: String,

    /// Latency applied by the simulated authority client
    pub simulated_latency_ms: u64,
}

impl Default for FilingAuthorityConfig {
    fn default() -> Self {
        Self {
            submit_enabled: true,
            force_offline: false,
            session_id: String::new(),
            simulated_latency_ms: 0,
        }
    }
}

impl FilingAuthorityConfig {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub pending_submission_publish_enabled: bool,
    pub submission_confirmation_publish_enabled: bool,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            pending_submission_publish_enabled: true,
            submission_confirmation_publish_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Number of executor tasks draining the action queue
    pub workers: usize,

    /// How often a paused executor re-probes the authority while offline
    pub offline_probe_interval_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            offline_probe_interval_ms: 30_000,
        }
    }
}

impl ExecutorConfig {
    pub fn offline_probe_interval(&self) -> Duration {
        Duration::from_millis(self.offline_probe_interval_ms)
    }
}

impl SubmitConfig {
    /// Reject configurations that would stall or mis-key the pipeline
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker.worker_id.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "worker_id",
                "worker",
            ));
        }
        if self.worker.worker_id.contains('/') {
            return Err(ConfigurationError::invalid_value(
                "worker_id",
                self.worker.worker_id.clone(),
                "worker id is used as a storage path segment and must not contain '/'",
            ));
        }
        if self.worker.worker_id == crate::constants::storage::ERRORS_FOLDER {
            return Err(ConfigurationError::invalid_value(
                "worker_id",
                self.worker.worker_id.clone(),
                "worker id collides with the error-batch folder",
            ));
        }
        if self.batching.max_batch_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_batch_size",
                "0",
                "batches must hold at least one submission",
            ));
        }
        let intervals = [
            ("batch_timeout_ms", self.batching.batch_timeout_ms),
            ("old_batch_interval_ms", self.batching.old_batch_interval_ms),
            ("error_polling_ms", self.batching.error_polling_ms),
            (
                "offline_probe_interval_ms",
                self.executor.offline_probe_interval_ms,
            ),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "scheduled intervals must be greater than zero",
                ));
            }
        }
        if self.executor.workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "workers",
                "0",
                "at least one executor worker is required",
            ));
        }
        Ok(())
    }
}
