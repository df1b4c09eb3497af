//! # Batch Processor
//!
//! Entry point into the pipeline for completed batches, whether freshly
//! flushed, left over from a previous run, or split out of a failed batch.

use crate::models::Batch;
use crate::pipeline::{Action, ActionQueue, InProgressBatches};
use crate::storage::{BatchRepository, StorageResult};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct BatchProcessor {
    worker_id: String,
    queue: Arc<ActionQueue>,
    in_progress: Arc<InProgressBatches>,
    repository: Arc<dyn BatchRepository>,
}

impl BatchProcessor {
    pub fn new(
        worker_id: impl Into<String>,
        queue: Arc<ActionQueue>,
        in_progress: Arc<InProgressBatches>,
        repository: Arc<dyn BatchRepository>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            queue,
            in_progress,
            repository,
        }
    }

    /// Queue CreateArchive for `batch` unless it is already in the pipeline.
    ///
    /// Returns `true` when this call claimed the batch.
    pub fn process_batch(&self, batch: Batch) -> bool {
        if !self.in_progress.try_claim(&batch) {
            debug!(
                batch_id = batch.batch_id,
                batch_path = %batch.path,
                "Batch already in progress, skipping"
            );
            return false;
        }

        info!(
            batch_id = batch.batch_id,
            batch_path = %batch.path,
            "📦 Batch queued for processing"
        );
        self.queue.push(Action::create_archive(batch));
        true
    }

    /// Hand every unprocessed batch to the pipeline, except `open_batch`.
    ///
    /// Returns the number of batches newly queued.
    pub async fn process_old_batches(&self, open_batch: Option<&Batch>) -> StorageResult<usize> {
        let batches = self.repository.unprocessed_batches(&self.worker_id).await?;
        let mut queued = 0;

        for batch in batches {
            if open_batch == Some(&batch) || self.in_progress.contains(&batch) {
                continue;
            }
            if self.process_batch(batch) {
                queued += 1;
            }
        }

        if queued > 0 {
            info!(worker_id = %self.worker_id, queued, "Recovered unprocessed batches");
        }
        Ok(queued)
    }
}
