use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for the action executor
#[derive(Debug, Default)]
pub struct PipelineStats {
    actions_executed: AtomicU64,
    batches_submitted: AtomicU64,
    batches_failed: AtomicU64,
    actions_requeued: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineStatsSnapshot {
    pub actions_executed: u64,
    pub batches_submitted: u64,
    pub batches_failed: u64,
    pub actions_requeued: u64,
}

impl PipelineStats {
    pub fn record_executed(&self) {
        self.actions_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_submitted(&self) {
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_requeued(&self) {
        self.actions_requeued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        PipelineStatsSnapshot {
            actions_executed: self.actions_executed.load(Ordering::Relaxed),
            batches_submitted: self.batches_submitted.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            actions_requeued: self.actions_requeued.load(Ordering::Relaxed),
        }
    }
}
