//! Batches currently owned by the pipeline, keyed by `(batch_id, path)`.

use crate::models::Batch;
use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct InProgressBatches {
    batches: DashSet<Batch>,
}

impl InProgressBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically take ownership of `batch`; `false` if it is already owned
    pub fn try_claim(&self, batch: &Batch) -> bool {
        self.batches.insert(batch.clone())
    }

    pub fn release(&self, batch: &Batch) -> bool {
        self.batches.remove(batch).is_some()
    }

    pub fn contains(&self, batch: &Batch) -> bool {
        self.batches.contains(batch)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Batch> {
        let mut batches: Vec<Batch> = self.batches.iter().map(|b| b.key().clone()).collect();
        batches.sort();
        batches
    }
}
