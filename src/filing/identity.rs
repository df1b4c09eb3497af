//! Per-worker session id overrides.

use super::FilingResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

#[async_trait]
pub trait IdentityLookup: Send + Sync + Debug {
    /// Session id this worker must use, or `None` to keep the configured default
    async fn session_id_override(&self, worker_id: &str) -> FilingResult<Option<String>>;
}

/// Fixed worker → session id table
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityLookup {
    overrides: HashMap<String, String>,
}

impl StaticIdentityLookup {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn with_override(mut self, worker_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        self.overrides.insert(worker_id.into(), session_id.into());
        self
    }
}

#[async_trait]
impl IdentityLookup for StaticIdentityLookup {
    async fn session_id_override(&self, worker_id: &str) -> FilingResult<Option<String>> {
        Ok(self.overrides.get(worker_id).cloned())
    }
}
