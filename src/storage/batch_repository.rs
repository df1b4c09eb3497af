//! # Batch Bookkeeping
//!
//! Answers "which batch is this worker writing" and "which batches were
//! written but never finished" purely from the object store, so a restarted
//! worker picks up where the crashed one left off.

use super::{locations, Clock, ObjectStore, StorageError, StorageResult};
use crate::config::{SubmitConfig, WorkerConfig};
use crate::models::{Batch, StoredSubmitterContext, Submission};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[async_trait]
pub trait BatchRepository: Send + Sync + std::fmt::Debug {
    /// Id the assembler should resume writing into after a restart
    async fn current_writing_batch_id(&self, worker_id: &str) -> StorageResult<u64>;

    /// Batches written by `worker_id` that are not the current writing batch
    async fn unprocessed_batches(&self, worker_id: &str) -> StorageResult<Vec<Batch>>;

    /// Number of submission folders already written under `batch`
    async fn submission_count(&self, batch: &Batch) -> StorageResult<usize>;

    /// Persist one submission's files under `batch`, `arrival_sequence` being
    /// its zero-based position among the batch's submissions
    async fn record_submission(
        &self,
        batch: &Batch,
        submission: &Submission,
        arrival_sequence: u64,
    ) -> StorageResult<()>;
}

/// Read the persisted context of `submission_id` under `batch_path`
pub async fn read_submitter_context(
    store: &dyn ObjectStore,
    batch_path: &str,
    submission_id: &str,
) -> StorageResult<StoredSubmitterContext> {
    let key = locations::submitter_context_key(batch_path, submission_id);
    let bytes = store.get(&key).await?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::serialization(key, e.to_string()))
}

#[derive(Debug, Clone, Copy)]
struct BatchFolderSummary {
    batch_id: u64,
    submission_count: usize,
    /// Oldest write; the batch's age counts from here
    first_modified: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ObjectStoreBatchRepository {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    worker: WorkerConfig,
    max_batch_size: usize,
    batch_timeout: Duration,
}

impl ObjectStoreBatchRepository {
    pub fn new(store: Arc<dyn ObjectStore>, clock: Arc<dyn Clock>, config: &SubmitConfig) -> Self {
        Self {
            store,
            clock,
            worker: config.worker.clone(),
            max_batch_size: config.batching.max_batch_size,
            batch_timeout: config.batching.batch_timeout(),
        }
    }

    fn batch_control_year(&self) -> i32 {
        self.worker.batch_control_year(self.clock.now())
    }

    async fn summarize_batches(&self, worker_id: &str) -> StorageResult<Vec<(String, BatchFolderSummary)>> {
        let worker_root = locations::worker_year_location(worker_id, self.batch_control_year());
        let mut summaries = Vec::new();

        for folder in self.store.list_subfolders(&worker_root).await? {
            let Some(batch_id) = locations::trailing_number(&folder) else {
                warn!(folder = %folder, "⚠️ Ignoring non-numeric batch folder");
                continue;
            };
            let objects = self.store.list_by_prefix(&folder).await?;
            let (Some(first_modified), Some(last_modified)) = (
                objects.iter().map(|o| o.last_modified).min(),
                objects.iter().map(|o| o.last_modified).max(),
            ) else {
                continue;
            };
            let submission_count = self.store.list_subfolders(&folder).await?.len();
            summaries.push((
                folder,
                BatchFolderSummary {
                    batch_id,
                    submission_count,
                    first_modified,
                    last_modified,
                },
            ));
        }

        Ok(summaries)
    }

    fn resume_id(&self, latest: &BatchFolderSummary) -> u64 {
        if latest.submission_count == 0 {
            return latest.batch_id;
        }
        let age = self
            .clock
            .now()
            .signed_duration_since(latest.first_modified)
            .to_std()
            .unwrap_or_default();
        if age >= self.batch_timeout || latest.submission_count >= self.max_batch_size {
            latest.batch_id + 1
        } else {
            latest.batch_id
        }
    }
}

#[async_trait]
impl BatchRepository for ObjectStoreBatchRepository {
    async fn current_writing_batch_id(&self, worker_id: &str) -> StorageResult<u64> {
        let summaries = self.summarize_batches(worker_id).await?;
        let latest = summaries
            .iter()
            .map(|(_, summary)| summary)
            .max_by_key(|summary| (summary.last_modified, summary.batch_id));

        let batch_id = match latest {
            Some(latest) => self.resume_id(latest),
            None => 0,
        };

        info!(
            worker_id = %worker_id,
            batch_id = batch_id,
            batch_folders = summaries.len(),
            "🔧 Resolved current writing batch"
        );
        Ok(batch_id)
    }

    async fn unprocessed_batches(&self, worker_id: &str) -> StorageResult<Vec<Batch>> {
        let current = self.current_writing_batch_id(worker_id).await?;
        let mut batches: Vec<Batch> = self
            .summarize_batches(worker_id)
            .await?
            .into_iter()
            .filter(|(_, summary)| summary.batch_id != current)
            .map(|(folder, summary)| Batch::new(summary.batch_id, folder))
            .collect();
        batches.sort();

        debug!(
            worker_id = %worker_id,
            current_batch_id = current,
            unprocessed = batches.len(),
            "Listed unprocessed batches"
        );
        Ok(batches)
    }

    async fn submission_count(&self, batch: &Batch) -> StorageResult<usize> {
        Ok(self.store.list_subfolders(&batch.path).await?.len())
    }

    async fn record_submission(
        &self,
        batch: &Batch,
        submission: &Submission,
        arrival_sequence: u64,
    ) -> StorageResult<()> {
        let submission_id = submission.submission_id();
        let context_key = locations::submitter_context_key(&batch.path, submission_id);
        let stored = StoredSubmitterContext::new(submission.context.clone(), arrival_sequence);
        let context = serde_json::to_vec(&stored)
            .map_err(|e| StorageError::serialization(context_key.clone(), e.to_string()))?;

        self.store
            .put(
                &locations::manifest_key(&batch.path, submission_id),
                submission.manifest_xml.clone().into_bytes(),
            )
            .await?;
        self.store
            .put(
                &locations::return_key(&batch.path, submission_id),
                submission.return_xml.clone().into_bytes(),
            )
            .await?;
        self.store.put(&context_key, context).await?;

        debug!(
            batch_id = batch.batch_id,
            batch_path = %batch.path,
            submission_id = %submission_id,
            arrival_sequence,
            "Recorded submission"
        );
        Ok(())
    }
}
