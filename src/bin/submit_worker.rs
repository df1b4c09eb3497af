//! # Submit Worker
//!
//! Runs one submission worker against an in-memory object store and the
//! simulated filing authority. Dispatch messages are read from stdin, one
//! JSON document per line; outbound notifications are written to stdout.
//!
//! ```text
//! SUBMIT_ENV=development cargo run --bin submit-worker < dispatches.jsonl
//! ```

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use submit_core::config::ConfigManager;
use submit_core::filing::{SimulatedFilingClient, StaticIdentityLookup};
use submit_core::logging;
use submit_core::messaging::{MessagePublisher, MessagingError, MessagingResult};
use submit_core::service::{ServiceCollaborators, SubmitService};
use submit_core::storage::{InMemoryObjectStore, SystemClock};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

/// Writes each published body to stdout prefixed by its destination
#[derive(Debug)]
struct StdoutPublisher {
    destination: String,
}

impl StdoutPublisher {
    fn new(destination: &str) -> Self {
        Self {
            destination: destination.to_string(),
        }
    }
}

#[async_trait]
impl MessagePublisher for StdoutPublisher {
    fn destination(&self) -> &str {
        &self.destination
    }

    async fn publish(&self, body: &str) -> MessagingResult<()> {
        let line = format!("{}\t{}\n", self.destination, body);
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| MessagingError::publish_failed(&self.destination, e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| MessagingError::publish_failed(&self.destination, e.to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    let manager = ConfigManager::load().context("failed to load submit configuration")?;
    let config = manager.config().clone();
    info!(
        environment = %manager.environment(),
        worker_id = %config.worker.worker_id,
        "🚀 Starting submit worker"
    );

    let service = SubmitService::new(
        config.clone(),
        ServiceCollaborators {
            store: Arc::new(InMemoryObjectStore::new()),
            clock: Arc::new(SystemClock),
            filing_client: Arc::new(SimulatedFilingClient::from_config(&config.filing_authority)),
            identity: Arc::new(StaticIdentityLookup::default()),
            pending_submission_publisher: Arc::new(StdoutPublisher::new("pending-submission")),
            confirmation_publishers: vec![
                Arc::new(StdoutPublisher::new("submission-confirmation")) as Arc<dyn MessagePublisher>
            ],
        },
    )
    .context("failed to build submit service")?;

    let scheduler = service.start().await.context("failed to start submit service")?;
    info!(tasks = scheduler.task_count(), "✅ Submit worker running");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    if let Err(e) = service.consumer().on_message(&line).await {
                        warn!(error = %e, "⚠️ Dispatch message rejected");
                    }
                }
                Ok(None) => {
                    info!("Dispatch input closed");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "❌ Failed to read dispatch input");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Shutdown signal received");
                break;
            }
        }
    }

    if let Some(batch) = service.assembler().on_timeout().await {
        info!(batch = %batch, "Flushed open batch on shutdown");
    }
    scheduler.shutdown().await;
    let drained = service.drain().await;

    let stats = service.executor().stats();
    info!(
        drained_actions = drained,
        stats = ?stats,
        "🏁 Submit worker stopped"
    );
    Ok(())
}
