//! # Batch Model
//!
//! A batch is identified by `(batch_id, path)`. Fresh batches get their path
//! from `(worker_id, batch_control_year, batch_id)`; error-recovery batches
//! reuse small ordinal ids under the error root, so the path is what keeps
//! two batches with the same id apart.

use crate::storage::locations;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub batch_id: u64,
    /// Object-store prefix holding the batch, always ending in `/`
    pub path: String,
}

impl Batch {
    pub fn new(batch_id: u64, path: impl Into<String>) -> Self {
        Self {
            batch_id,
            path: path.into(),
        }
    }

    /// Batch written by the assembler of `worker_id` for `batch_control_year`
    pub fn for_worker(worker_id: &str, batch_control_year: i32, batch_id: u64) -> Self {
        Self::new(
            batch_id,
            locations::batch_location(worker_id, batch_control_year, batch_id),
        )
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Batch[{} @ {}]", self.batch_id, self.path)
    }
}
