//! # Scheduler
//!
//! Background tasks of a running worker: the batch-flush timer, old-batch
//! recovery, error-batch polling, and the action executor workers. Every task
//! watches one shutdown channel and stops between iterations, never in the
//! middle of an action.

use crate::batching::{BatchAssembler, ErrorBatchRecovery};
use crate::config::SubmitConfig;
use crate::logging::log_error;
use crate::pipeline::ActionExecutor;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Running background tasks; dropping it without `shutdown` leaves them running
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Signal every task to stop and wait for them to finish
    pub async fn shutdown(self) {
        info!(tasks = self.handles.len(), "🛑 Scheduler shutting down");
        let _ = self.shutdown.send(true);

        for result in futures::future::join_all(self.handles).await {
            if let Err(e) = result {
                error!(error = %e, "Scheduled task ended abnormally");
            }
        }
        info!("Scheduler stopped");
    }
}

pub fn start(
    config: &SubmitConfig,
    assembler: Arc<BatchAssembler>,
    recovery: Arc<ErrorBatchRecovery>,
    executor: Arc<ActionExecutor>,
) -> SchedulerHandle {
    let (shutdown, shutdown_rx) = watch::channel(false);
    let mut handles = Vec::new();

    let batch_timeout = config.batching.batch_timeout();
    handles.push(spawn_periodic(
        "batch_timeout_flush",
        batch_timeout,
        batch_timeout,
        shutdown_rx.clone(),
        {
            let assembler = assembler.clone();
            move || {
                let assembler = assembler.clone();
                async move {
                    if let Some(batch) = assembler.on_timeout().await {
                        debug!(batch_id = batch.batch_id, "Timeout flush closed batch");
                    }
                }
            }
        },
    ));

    handles.push(spawn_periodic(
        "old_batch_recovery",
        Duration::ZERO,
        config.batching.old_batch_interval(),
        shutdown_rx.clone(),
        {
            let assembler = assembler.clone();
            move || {
                let assembler = assembler.clone();
                async move {
                    if let Err(e) = assembler.resume_unprocessed_batches().await {
                        log_error("scheduler", "old_batch_recovery", &e.to_string(), None);
                    }
                }
            }
        },
    ));

    handles.push(spawn_periodic(
        "error_batch_poll",
        config.batching.error_polling_initial_delay(),
        config.batching.error_polling_interval(),
        shutdown_rx.clone(),
        move || {
            let recovery = recovery.clone();
            async move {
                if let Err(e) = recovery.poll().await {
                    log_error("scheduler", "error_batch_poll", &e.to_string(), None);
                }
            }
        },
    ));

    for worker_index in 0..config.executor.workers {
        handles.push(tokio::spawn(
            executor.clone().run(worker_index, shutdown_rx.clone()),
        ));
    }

    info!(
        tasks = handles.len(),
        executor_workers = config.executor.workers,
        "⏰ Scheduler started"
    );
    SchedulerHandle { shutdown, handles }
}

fn spawn_periodic<F, Fut>(
    name: &'static str,
    initial_delay: Duration,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    task: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if !initial_delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(initial_delay) => {}
                _ = shutdown.changed() => return,
            }
        }

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => task().await,
                _ = shutdown.changed() => break,
            }
        }
        debug!(task = name, "Scheduled task stopped");
    })
}
