//! # Submit Service
//!
//! Composition root. Builds the shared pipeline state (action queue,
//! in-progress set, offline-mode breaker) once and wires it into the
//! assembler, processor, recovery, executor, and dispatch consumer.

use crate::batching::{BatchAssembler, BatchProcessor, ErrorBatchRecovery};
use crate::config::SubmitConfig;
use crate::error::SubmitResult;
use crate::filing::{FilingAuthorityClient, IdentityLookup};
use crate::messaging::{DispatchConsumer, MessagePublisher, NotificationService};
use crate::pipeline::{ActionExecutor, ActionQueue, ExecutorContext, InProgressBatches};
use crate::resilience::OfflineMode;
use crate::scheduler::{self, SchedulerHandle};
use crate::storage::{BatchRepository, Clock, ObjectStore, ObjectStoreBatchRepository};
use std::sync::Arc;
use tracing::info;

/// External systems the service talks to
#[derive(Debug, Clone)]
pub struct ServiceCollaborators {
    pub store: Arc<dyn ObjectStore>,
    pub clock: Arc<dyn Clock>,
    pub filing_client: Arc<dyn FilingAuthorityClient>,
    pub identity: Arc<dyn IdentityLookup>,
    pub pending_submission_publisher: Arc<dyn MessagePublisher>,
    pub confirmation_publishers: Vec<Arc<dyn MessagePublisher>>,
}

#[derive(Debug)]
pub struct SubmitService {
    config: SubmitConfig,
    queue: Arc<ActionQueue>,
    in_progress: Arc<InProgressBatches>,
    offline_mode: Arc<OfflineMode>,
    repository: Arc<dyn BatchRepository>,
    processor: Arc<BatchProcessor>,
    assembler: Arc<BatchAssembler>,
    recovery: Arc<ErrorBatchRecovery>,
    executor: Arc<ActionExecutor>,
    consumer: DispatchConsumer,
}

impl SubmitService {
    pub fn new(config: SubmitConfig, collaborators: ServiceCollaborators) -> SubmitResult<Self> {
        config.validate()?;
        let ServiceCollaborators {
            store,
            clock,
            filing_client,
            identity,
            pending_submission_publisher,
            confirmation_publishers,
        } = collaborators;

        let queue = Arc::new(ActionQueue::new());
        let in_progress = Arc::new(InProgressBatches::new());
        let offline_mode = Arc::new(OfflineMode::default());

        let repository: Arc<dyn BatchRepository> = Arc::new(ObjectStoreBatchRepository::new(
            store.clone(),
            clock.clone(),
            &config,
        ));
        let processor = Arc::new(BatchProcessor::new(
            config.worker.worker_id.clone(),
            queue.clone(),
            in_progress.clone(),
            repository.clone(),
        ));
        let assembler = Arc::new(BatchAssembler::new(
            &config,
            clock.clone(),
            repository.clone(),
            processor.clone(),
        ));
        let recovery = Arc::new(ErrorBatchRecovery::new(
            &config,
            store.clone(),
            clock,
            processor.clone(),
        ));
        let notifications = NotificationService::new(
            config.messaging.clone(),
            pending_submission_publisher,
            confirmation_publishers,
        );
        let executor = Arc::new(ActionExecutor::new(
            &config,
            ExecutorContext {
                queue: queue.clone(),
                in_progress: in_progress.clone(),
                offline_mode: offline_mode.clone(),
                store,
                filing_client,
                identity,
                notifications,
                recovery: recovery.clone(),
            },
        ));
        let consumer = DispatchConsumer::new(assembler.clone());

        Ok(Self {
            config,
            queue,
            in_progress,
            offline_mode,
            repository,
            processor,
            assembler,
            recovery,
            executor,
            consumer,
        })
    }

    /// Resolve identity and resume batch numbering, without starting background tasks
    pub async fn initialize(&self) -> SubmitResult<()> {
        self.executor.initialize().await;
        let batch_id = self.assembler.initialize().await?;
        info!(
            worker_id = %self.config.worker.worker_id,
            batch_id,
            "🟢 Submit service initialized"
        );
        Ok(())
    }

    /// Initialize and start the scheduler and executor workers
    pub async fn start(&self) -> SubmitResult<SchedulerHandle> {
        self.initialize().await?;
        Ok(scheduler::start(
            &self.config,
            self.assembler.clone(),
            self.recovery.clone(),
            self.executor.clone(),
        ))
    }

    /// Run queued actions on the calling task until the queue is empty or
    /// offline mode is entered. Actions queued while offline stay queued.
    ///
    /// Returns the number of actions executed.
    pub async fn drain(&self) -> usize {
        let mut executed = 0;
        while !self.offline_mode.is_enabled() {
            let Some(action) = self.queue.try_next() else {
                break;
            };
            self.executor.handle_action(action).await;
            executed += 1;
        }
        executed
    }

    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    pub fn consumer(&self) -> &DispatchConsumer {
        &self.consumer
    }

    pub fn assembler(&self) -> &Arc<BatchAssembler> {
        &self.assembler
    }

    pub fn processor(&self) -> &Arc<BatchProcessor> {
        &self.processor
    }

    pub fn recovery(&self) -> &Arc<ErrorBatchRecovery> {
        &self.recovery
    }

    pub fn executor(&self) -> &Arc<ActionExecutor> {
        &self.executor
    }

    pub fn repository(&self) -> &Arc<dyn BatchRepository> {
        &self.repository
    }

    pub fn queue(&self) -> &Arc<ActionQueue> {
        &self.queue
    }

    pub fn in_progress(&self) -> &Arc<InProgressBatches> {
        &self.in_progress
    }

    pub fn offline_mode(&self) -> &Arc<OfflineMode> {
        &self.offline_mode
    }
}
