//! # Error-Batch Recovery
//!
//! A rejected multi-submission batch is split into one single-submission
//! batch per submission under the error root:
//!
//! ```text
//! pre-submission-batching/errors/{worker}/{year}/{batch}/{ordinal}/{submission}/{file}
//! ```
//!
//! The poller later feeds each ordinal folder back into the pipeline as
//! `Batch { batch_id: ordinal, path: ordinal_folder }`. `userContext.json` is
//! copied last and marks an ordinal as complete; the poller skips ordinals
//! without it.

use super::BatchProcessor;
use crate::config::{SubmitConfig, WorkerConfig};
use crate::constants::storage::SUBMITTER_CONTEXT_FILE;
use crate::models::Batch;
use crate::storage::{locations, read_submitter_context, Clock, ObjectStore, StorageResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct ErrorBatchRecovery {
    worker: WorkerConfig,
    submit_enabled: bool,
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    processor: Arc<BatchProcessor>,
}

impl ErrorBatchRecovery {
    pub fn new(
        config: &SubmitConfig,
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        processor: Arc<BatchProcessor>,
    ) -> Self {
        Self {
            worker: config.worker.clone(),
            submit_enabled: config.filing_authority.submit_enabled,
            store,
            clock,
            processor,
        }
    }

    fn batch_control_year(&self) -> i32 {
        self.worker.batch_control_year(self.clock.now())
    }

    /// Copy each submission of `batch` into its own ordinal folder.
    ///
    /// Ordinals follow arrival order. Originals are not touched.
    /// Returns the number of submissions split out.
    pub async fn process_failed_batch(&self, batch: &Batch) -> StorageResult<usize> {
        let objects = self.store.list_by_prefix(&batch.path).await?;

        let mut by_submission: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for object in &objects {
            match locations::split_submission_key(&batch.path, &object.key) {
                Some((submission_id, file_name)) => by_submission
                    .entry(submission_id)
                    .or_default()
                    .push((object.key.as_str(), file_name)),
                None => warn!(batch_path = %batch.path, key = %object.key, "⚠️ Not splitting stray object"),
            }
        }

        let mut ordered = Vec::with_capacity(by_submission.len());
        for (submission_id, mut files) in by_submission {
            let arrival_sequence =
                read_submitter_context(self.store.as_ref(), &batch.path, submission_id)
                    .await?
                    .arrival_sequence;
            files.sort_by_key(|(_, file_name)| *file_name == SUBMITTER_CONTEXT_FILE);
            ordered.push((arrival_sequence, submission_id, files));
        }
        ordered.sort_by_key(|(arrival_sequence, _, _)| *arrival_sequence);

        let year = self.batch_control_year();
        for (ordinal, (_, submission_id, files)) in ordered.iter().enumerate() {
            let target = locations::submission_location(
                &locations::split_location(&self.worker.worker_id, year, batch.batch_id, ordinal),
                submission_id,
            );
            for (key, file_name) in files {
                self.store.copy(key, &format!("{target}{file_name}")).await?;
            }
            debug!(
                batch_id = batch.batch_id,
                ordinal,
                submission_id = %submission_id,
                "Split submission into error batch"
            );
        }

        info!(
            batch_id = batch.batch_id,
            batch_path = %batch.path,
            split_count = ordered.len(),
            "🔧 Failed batch split"
        );
        Ok(ordered.len())
    }

    /// Feed every split ordinal folder of the current year into the pipeline.
    ///
    /// No-op while submission is disabled. Returns the number of batches newly queued.
    pub async fn poll(&self) -> StorageResult<usize> {
        if !self.submit_enabled {
            debug!("Submission disabled, skipping error batch poll");
            return Ok(0);
        }

        let root = locations::error_root(&self.worker.worker_id, self.batch_control_year());
        let mut queued = 0;

        for failed_batch_folder in self.store.list_subfolders(&root).await? {
            for ordinal_folder in self.store.list_subfolders(&failed_batch_folder).await? {
                let Some(ordinal) = locations::trailing_number(&ordinal_folder) else {
                    warn!(folder = %ordinal_folder, "⚠️ Skipping non-numeric ordinal folder");
                    continue;
                };
                if !self.split_complete(&ordinal_folder).await? {
                    debug!(folder = %ordinal_folder, "Ordinal still being split, skipping");
                    continue;
                }
                if self.processor.process_batch(Batch::new(ordinal, ordinal_folder)) {
                    queued += 1;
                }
            }
        }

        if queued > 0 {
            info!(worker_id = %self.worker.worker_id, queued, "Queued error batches for retry");
        }
        Ok(queued)
    }

    async fn split_complete(&self, ordinal_folder: &str) -> StorageResult<bool> {
        let objects = self.store.list_by_prefix(ordinal_folder).await?;
        Ok(objects.iter().any(|object| {
            matches!(
                locations::split_submission_key(ordinal_folder, &object.key),
                Some((_, SUBMITTER_CONTEXT_FILE))
            )
        }))
    }
}
