//! # Batch Assembler
//!
//! Accumulates dispatched submissions into the open batch and closes it when
//! it reaches the configured size or when the flush timer fires. Writes,
//! timeout flushes, and old-batch recovery all run under one async mutex, so
//! the open batch is never handed to the pipeline while it still accepts
//! submissions.

use super::BatchProcessor;
use crate::config::{SubmitConfig, WorkerConfig};
use crate::error::SubmitResult;
use crate::logging::log_batch_operation;
use crate::models::{Batch, Submission};
use crate::storage::{BatchRepository, Clock};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Default)]
struct AssemblerState {
    batch_id: u64,
    size: usize,
    /// Fixed on the first write so a year boundary cannot move the open batch
    open_batch: Option<Batch>,
}

#[derive(Debug)]
pub struct BatchAssembler {
    worker: WorkerConfig,
    max_batch_size: usize,
    clock: Arc<dyn Clock>,
    repository: Arc<dyn BatchRepository>,
    processor: Arc<BatchProcessor>,
    state: Mutex<AssemblerState>,
}

impl BatchAssembler {
    pub fn new(
        config: &SubmitConfig,
        clock: Arc<dyn Clock>,
        repository: Arc<dyn BatchRepository>,
        processor: Arc<BatchProcessor>,
    ) -> Self {
        Self {
            worker: config.worker.clone(),
            max_batch_size: config.batching.max_batch_size.max(1),
            clock,
            repository,
            processor,
            state: Mutex::new(AssemblerState::default()),
        }
    }

    /// Resume numbering from what storage says this worker was writing.
    ///
    /// A resumed batch that already holds submissions becomes the open batch
    /// with its stored size, so the next timeout flushes it.
    pub async fn initialize(&self) -> SubmitResult<u64> {
        let batch_id = self
            .repository
            .current_writing_batch_id(&self.worker.worker_id)
            .await?;
        let year = self.worker.batch_control_year(self.clock.now());
        let resumed = Batch::for_worker(&self.worker.worker_id, year, batch_id);
        let size = self.repository.submission_count(&resumed).await?;

        let mut state = self.state.lock().await;
        state.batch_id = batch_id;
        state.size = size;
        state.open_batch = (size > 0).then_some(resumed);

        info!(
            worker_id = %self.worker.worker_id,
            batch_id,
            resumed_size = size,
            "🔧 Batch assembler initialized"
        );
        Ok(batch_id)
    }

    /// Persist `submission` into the open batch, flushing when it becomes full.
    ///
    /// Storage failures are returned so the transport can redeliver.
    pub async fn add_submission(&self, submission: Submission) -> SubmitResult<()> {
        let mut state = self.state.lock().await;
        let batch = self.open_batch(&state);

        self.repository
            .record_submission(&batch, &submission, state.size as u64)
            .await?;
        state.open_batch = Some(batch);
        state.size += 1;

        if state.size >= self.max_batch_size {
            self.flush(&mut state, "size");
        }
        Ok(())
    }

    /// Close the open batch if it holds anything
    pub async fn on_timeout(&self) -> Option<Batch> {
        let mut state = self.state.lock().await;
        if state.size == 0 {
            return None;
        }
        Some(self.flush(&mut state, "timeout"))
    }

    /// Queue every unprocessed batch except the one currently open for writing
    pub async fn resume_unprocessed_batches(&self) -> SubmitResult<usize> {
        let state = self.state.lock().await;
        let open = self.open_batch(&state);
        Ok(self.processor.process_old_batches(Some(&open)).await?)
    }

    pub async fn current_batch_id(&self) -> u64 {
        self.state.lock().await.batch_id
    }

    pub async fn current_size(&self) -> usize {
        self.state.lock().await.size
    }

    fn open_batch(&self, state: &AssemblerState) -> Batch {
        state.open_batch.clone().unwrap_or_else(|| {
            let year = self.worker.batch_control_year(self.clock.now());
            Batch::for_worker(&self.worker.worker_id, year, state.batch_id)
        })
    }

    fn flush(&self, state: &mut AssemblerState, trigger: &str) -> Batch {
        let batch = self.open_batch(state);
        let size = state.size;

        log_batch_operation(
            "flush",
            batch.batch_id,
            &batch.path,
            trigger,
            Some(size),
            None,
        );
        self.processor.process_batch(batch.clone());

        state.batch_id += 1;
        state.size = 0;
        state.open_batch = None;
        batch
    }
}
