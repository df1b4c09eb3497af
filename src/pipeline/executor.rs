//! # Action Executor
//!
//! Drains the action queue one action at a time and drives each batch
//! through CreateArchive → BundleArchive → SubmitBundle → Cleanup, taking the
//! failure branches when a stage fails.
//!
//! Logout doubles as the filing authority's liveness probe: after a failed
//! login or submit the executor logs out; if that succeeds the authority is
//! reachable and the failure was about content, if it fails the authority is
//! down, offline mode is enabled and the same action goes back on the queue.

use super::action::{
    Action, ActionKind, BundleArchiveAction, CleanupAction, CreateArchiveAction,
    SubmissionFailureAction, SubmitBundleAction,
};
use super::failure::{FailureKind, StageError};
use super::stats::{PipelineStats, PipelineStatsSnapshot};
use super::{stages, ActionQueue, InProgressBatches};
use crate::batching::ErrorBatchRecovery;
use crate::config::SubmitConfig;
use crate::filing::{FilingAuthorityClient, IdentityLookup};
use crate::logging::{log_action_operation, redact_tail};
use crate::messaging::{FailureMetadata, NotificationService, SubmissionConfirmationEntry};
use crate::models::SubmittedResult;
use crate::resilience::OfflineMode;
use crate::storage::ObjectStore;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Shared state and collaborators the executor works against
#[derive(Debug, Clone)]
pub struct ExecutorContext {
    pub queue: Arc<ActionQueue>,
    pub in_progress: Arc<InProgressBatches>,
    pub offline_mode: Arc<OfflineMode>,
    pub store: Arc<dyn ObjectStore>,
    pub filing_client: Arc<dyn FilingAuthorityClient>,
    pub identity: Arc<dyn IdentityLookup>,
    pub notifications: NotificationService,
    pub recovery: Arc<ErrorBatchRecovery>,
}

#[derive(Debug)]
pub struct ActionExecutor {
    worker_id: String,
    submit_enabled: bool,
    force_offline: bool,
    offline_probe_interval: Duration,
    session_id: RwLock<String>,
    context: ExecutorContext,
    stats: PipelineStats,
}

impl ActionExecutor {
    pub fn new(config: &SubmitConfig, context: ExecutorContext) -> Self {
        Self {
            worker_id: config.worker.worker_id.clone(),
            submit_enabled: config.filing_authority.submit_enabled,
            force_offline: config.filing_authority.force_offline,
            offline_probe_interval: config.executor.offline_probe_interval(),
            session_id: RwLock::new(config.filing_authority.session_id.clone()),
            context,
            stats: PipelineStats::default(),
        }
    }

    /// Resolve the worker's session id before the first batch runs
    pub async fn initialize(&self) {
        self.refresh_session_id().await;
    }

    /// Session id currently in effect
    pub fn session_id(&self) -> String {
        self.session_id.read().clone()
    }

    pub fn stats(&self) -> PipelineStatsSnapshot {
        self.stats.snapshot()
    }

    /// Execute one action and enqueue whatever follows it
    pub async fn handle_action(&self, action: Action) {
        let started = Instant::now();
        let kind = action.kind();
        let batch = action.batch().clone();
        self.stats.record_executed();
        debug!(action = %kind, batch_id = batch.batch_id, batch_path = %batch.path, "Running action");

        let outcome = match &action {
            Action::CreateArchive(create) => self.create_archive(create).await,
            Action::BundleArchive(bundle) => self.bundle_archive(bundle).await,
            Action::SubmitBundle(submit) => self.submit_bundle(submit).await,
            Action::SubmissionFailure(failure) => self.submission_failure(failure).await,
            Action::Cleanup(cleanup) => self.cleanup(cleanup).await,
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(()) => log_action_operation(
                &kind.to_string(),
                batch.batch_id,
                &batch.path,
                "completed",
                Some(duration_ms),
                None,
            ),
            Err(stage_error) => {
                log_action_operation(
                    &kind.to_string(),
                    batch.batch_id,
                    &batch.path,
                    "failed",
                    Some(duration_ms),
                    Some(stage_error.message()),
                );
                self.handle_stage_error(action, stage_error).await;
            }
        }
    }

    /// Worker loop: dispatch actions until shutdown, probing the authority instead while offline
    pub async fn run(self: Arc<Self>, worker_index: usize, mut shutdown: watch::Receiver<bool>) {
        info!(worker_id = %self.worker_id, worker_index, "🚀 Action executor started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            if self.context.offline_mode.is_enabled() {
                tokio::select! {
                    _ = tokio::time::sleep(self.offline_probe_interval) => {
                        self.probe_filing_authority().await;
                    }
                    _ = shutdown.changed() => break,
                }
                continue;
            }

            tokio::select! {
                action = self.context.queue.next() => {
                    if self.context.offline_mode.is_enabled() {
                        self.context.queue.push_front(action);
                        continue;
                    }
                    self.handle_action(action).await;
                }
                _ = shutdown.changed() => break,
            }
        }

        info!(worker_id = %self.worker_id, worker_index, "🛑 Action executor stopped");
    }

    /// Login + logout; both succeeding means the authority is back
    pub async fn probe_filing_authority(&self) -> bool {
        let client = &self.context.filing_client;
        let reachable = match client.login().await {
            Ok(()) => client.logout().await.is_ok(),
            Err(_) => false,
        };

        if reachable {
            self.context.offline_mode.disable();
        } else {
            debug!(worker_id = %self.worker_id, "Filing authority still unreachable");
        }
        reachable
    }

    async fn refresh_session_id(&self) {
        match self.context.identity.session_id_override(&self.worker_id).await {
            Ok(Some(session_id)) if !session_id.trim().is_empty() => {
                let changed = {
                    let mut current = self.session_id.write();
                    if *current != session_id {
                        *current = session_id.clone();
                        true
                    } else {
                        false
                    }
                };
                if changed {
                    self.context.filing_client.apply_session_id(&session_id);
                    info!(
                        worker_id = %self.worker_id,
                        session_id = %redact_tail(&session_id),
                        "🔧 Applied worker-specific session id"
                    );
                }
            }
            Ok(_) => debug!(worker_id = %self.worker_id, "No session id override for worker"),
            Err(e) => warn!(
                worker_id = %self.worker_id,
                error = %e,
                "Session id lookup failed, keeping current session id"
            ),
        }
    }

    async fn create_archive(&self, action: &CreateArchiveAction) -> Result<(), StageError> {
        self.refresh_session_id().await;

        let archives = stages::create_archives(self.context.store.as_ref(), &action.batch)
            .await
            .map_err(|e| StageError::local_failure(ActionKind::CreateArchive, e.to_string()))?;

        if archives.is_empty() {
            warn!(
                batch_id = action.batch.batch_id,
                batch_path = %action.batch.path,
                "No archives created for batch"
            );
            return Ok(());
        }

        self.context
            .queue
            .push(Action::bundle_archive(action.batch.clone(), archives));
        Ok(())
    }

    async fn bundle_archive(&self, action: &BundleArchiveAction) -> Result<(), StageError> {
        let bundle = stages::bundle_archives(action.archives.clone())
            .map_err(|message| StageError::local_failure(ActionKind::BundleArchive, message))?;

        info!(
            batch_id = action.batch.batch_id,
            bundle_id = %bundle.bundle_id,
            submission_count = bundle.len(),
            "Created bundle for filing authority"
        );
        self.context
            .queue
            .push(Action::submit_bundle(action.batch.clone(), bundle));
        Ok(())
    }

    async fn submit_bundle(&self, action: &SubmitBundleAction) -> Result<(), StageError> {
        if !self.submit_enabled || self.force_offline || self.context.offline_mode.is_enabled() {
            info!(
                batch_id = action.batch.batch_id,
                batch_path = %action.batch.path,
                submission_count = action.bundle.len(),
                submit_enabled = self.submit_enabled,
                force_offline = self.force_offline,
                "Submission skipped, cleaning up batch"
            );
            self.context.queue.push(Action::cleanup(action.batch.clone()));
            return Ok(());
        }

        let client = &self.context.filing_client;

        if let Err(login_error) = client.login().await {
            error!(worker_id = %self.worker_id, error = %login_error, "Failed to log in to filing authority");
            return match client.logout().await {
                Ok(()) => Err(StageError::unclassified(
                    ActionKind::SubmitBundle,
                    format!("login failed while filing authority reachable: {login_error}"),
                )),
                Err(logout_error) => Err(StageError::connectivity(
                    ActionKind::SubmitBundle,
                    format!("login failed: {login_error}; logout failed: {logout_error}"),
                )),
            };
        }

        let receipts = match client.submit(&action.bundle).await {
            Ok(receipts) => receipts,
            Err(submit_error) => {
                error!(
                    batch_id = action.batch.batch_id,
                    batch_path = %action.batch.path,
                    error = %submit_error,
                    "Failed to submit bundle to filing authority"
                );
                return match client.logout().await {
                    Ok(()) => Err(StageError::content_rejection(
                        ActionKind::SubmitBundle,
                        submit_error.to_string(),
                    )),
                    Err(logout_error) => Err(StageError::connectivity(
                        ActionKind::SubmitBundle,
                        format!("submit failed: {submit_error}; logout failed: {logout_error}"),
                    )),
                };
            }
        };

        client.logout().await.map_err(|logout_error| {
            StageError::connectivity(
                ActionKind::SubmitBundle,
                format!("logout after submit failed: {logout_error}"),
            )
        })?;

        let result = SubmittedResult::new(
            action.batch.clone(),
            action.bundle.submitter_contexts.clone(),
            receipts,
        );
        info!(
            batch_id = result.batch.batch_id,
            batch_path = %result.batch.path,
            submission_count = result.submitter_contexts.len(),
            receipt_count = result.receipts.len(),
            "✅ Submitted batch to filing authority"
        );
        self.stats.record_submitted();
        self.context.queue.push(Action::cleanup(action.batch.clone()));

        let notifications = &self.context.notifications;
        notifications
            .publish_pending_submissions(result.pending_submissions())
            .await;
        notifications
            .publish_confirmations(
                result
                    .entries()
                    .iter()
                    .map(SubmissionConfirmationEntry::submitted)
                    .collect(),
            )
            .await;
        Ok(())
    }

    async fn submission_failure(&self, action: &SubmissionFailureAction) -> Result<(), StageError> {
        let split = self
            .context
            .recovery
            .process_failed_batch(&action.batch)
            .await
            .map_err(|e| StageError::unclassified(ActionKind::SubmissionFailure, e.to_string()))?;

        info!(
            batch_id = action.batch.batch_id,
            batch_path = %action.batch.path,
            split_count = split,
            error_message = %action.error_message,
            "Split rejected batch for individual retry"
        );
        self.context.queue.push(Action::cleanup(action.batch.clone()));
        Ok(())
    }

    async fn cleanup(&self, action: &CleanupAction) -> Result<(), StageError> {
        let removed = stages::cleanup_batch(self.context.store.as_ref(), &action.batch)
            .await
            .map_err(|e| StageError::unclassified(ActionKind::Cleanup, e.to_string()))?;

        self.context.in_progress.release(&action.batch);
        debug!(
            batch_id = action.batch.batch_id,
            batch_path = %action.batch.path,
            removed_objects = removed,
            "Batch cleaned up"
        );
        Ok(())
    }

    async fn handle_stage_error(&self, action: Action, stage_error: StageError) {
        match (stage_error.kind(), action) {
            (Some(FailureKind::Connectivity), action) => {
                self.context.offline_mode.enable();
                self.stats.record_requeued();
                warn!(
                    action = %action.kind(),
                    batch_id = action.batch().batch_id,
                    error = %stage_error,
                    "Filing authority unreachable, re-queueing action"
                );
                self.context.queue.push(action);
            }
            (Some(FailureKind::ContentRejection), Action::SubmitBundle(submit)) => {
                self.handle_rejection(submit, stage_error.message()).await;
            }
            (Some(FailureKind::LocalFailure), Action::BundleArchive(bundle)) => {
                self.report_bundle_failure(bundle, stage_error.message()).await;
            }
            (_, action) => {
                error!(
                    action = %action.kind(),
                    batch_id = action.batch().batch_id,
                    batch_path = %action.batch().path,
                    error = %stage_error,
                    "Action failed, batch remains in progress"
                );
            }
        }
    }

    async fn handle_rejection(&self, action: SubmitBundleAction, message: &str) {
        let SubmitBundleAction { batch, bundle } = action;
        match bundle.len() {
            0 => error!(
                batch_id = batch.batch_id,
                batch_path = %batch.path,
                "Unable to submit bundle because batch is empty"
            ),
            1 => {
                self.stats.record_failed();
                let context = &bundle.submitter_contexts[0];
                error!(
                    batch_id = batch.batch_id,
                    submission_id = %context.submission_id,
                    "Filing authority rejected single-submission batch"
                );
                let entry = SubmissionConfirmationEntry::failed(
                    context,
                    FailureMetadata::processing(format!(
                        "Submission to filing authority failed, {message}"
                    )),
                );
                self.context.queue.push(Action::cleanup(batch));
                self.context.notifications.publish_confirmations(vec![entry]).await;
            }
            submission_count => {
                warn!(
                    batch_id = batch.batch_id,
                    batch_path = %batch.path,
                    submission_count,
                    "Filing authority rejected batch, splitting for individual retry"
                );
                self.context
                    .queue
                    .push(Action::submission_failure(batch, bundle, message));
            }
        }
    }

    async fn report_bundle_failure(&self, action: BundleArchiveAction, message: &str) {
        self.stats.record_failed();
        error!(
            batch_id = action.batch.batch_id,
            batch_path = %action.batch.path,
            submission_count = action.archives.len(),
            error = %message,
            "Unable to bundle batch, reporting submissions as failed"
        );

        let entries = action
            .archives
            .iter()
            .map(|archive| {
                SubmissionConfirmationEntry::failed(
                    &archive.context,
                    FailureMetadata::processing(format!("Bundling failed, {message}")),
                )
            })
            .collect();
        self.context.notifications.publish_confirmations(entries).await;
        self.context.queue.push(Action::cleanup(action.batch));
    }
}
