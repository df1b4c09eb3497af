//! # Notification Publishing
//!
//! `MessagePublisher` is the transport seam. `NotificationService` builds the
//! outbound payloads, applies the per-message-type publish flags, and fans
//! confirmations out to every registered confirmation publisher. Publishing
//! is fire-and-forget: failures are logged and never reach the pipeline.

use super::outbound::{
    PendingSubmissionPayloadV1, SubmissionConfirmationEntry, SubmissionConfirmationPayloadV2,
};
use super::{MessagingError, MessagingResult};
use crate::config::MessagingConfig;
use crate::models::TaxReturnIdAndSubmissionId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

#[async_trait]
pub trait MessagePublisher: Send + Sync + Debug {
    /// Queue or topic name, used in logs
    fn destination(&self) -> &str;

    async fn publish(&self, body: &str) -> MessagingResult<()>;
}

/// Publisher that keeps every message body in memory
#[derive(Debug)]
pub struct RecordingPublisher {
    destination: String,
    messages: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            messages: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Published bodies parsed back into JSON values
    pub fn json_messages(&self) -> Vec<serde_json::Value> {
        self.messages
            .lock()
            .iter()
            .filter_map(|body| serde_json::from_str(body).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    fn destination(&self) -> &str {
        &self.destination
    }

    async fn publish(&self, body: &str) -> MessagingResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MessagingError::publish_failed(
                &self.destination,
                "publisher disabled",
            ));
        }
        self.messages.lock().push(body.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    config: MessagingConfig,
    pending_submission_publisher: Arc<dyn MessagePublisher>,
    confirmation_publishers: Vec<Arc<dyn MessagePublisher>>,
}

impl NotificationService {
    pub fn new(
        config: MessagingConfig,
        pending_submission_publisher: Arc<dyn MessagePublisher>,
        confirmation_publishers: Vec<Arc<dyn MessagePublisher>>,
    ) -> Self {
        Self {
            config,
            pending_submission_publisher,
            confirmation_publishers,
        }
    }

    /// Announce every submission of a successfully submitted batch
    pub async fn publish_pending_submissions(&self, pending: Vec<TaxReturnIdAndSubmissionId>) {
        if !self.config.pending_submission_publish_enabled {
            debug!("Pending-submission publishing disabled, skipping");
            return;
        }

        let count = pending.len();
        let payload = PendingSubmissionPayloadV1 {
            pending_submissions: pending,
        };
        let body = match payload.to_message_json() {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to serialize pending-submission notice");
                return;
            }
        };

        let publisher = &self.pending_submission_publisher;
        match publisher.publish(&body).await {
            Ok(()) => info!(
                destination = %publisher.destination(),
                submission_count = count,
                "📤 Published pending-submission notice"
            ),
            Err(e) => error!(
                destination = %publisher.destination(),
                error = %e,
                "Failed to publish pending-submission notice"
            ),
        }
    }

    /// Report SUBMITTED/FAILED outcomes to every confirmation publisher
    pub async fn publish_confirmations(&self, entries: Vec<SubmissionConfirmationEntry>) {
        if !self.config.submission_confirmation_publish_enabled {
            debug!("Submission-confirmation publishing disabled, skipping");
            return;
        }
        if entries.is_empty() {
            debug!("No confirmation entries to publish");
            return;
        }

        let count = entries.len();
        let body = match (SubmissionConfirmationPayloadV2 { entries }).to_message_json() {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to serialize submission confirmation");
                return;
            }
        };

        for publisher in &self.confirmation_publishers {
            match publisher.publish(&body).await {
                Ok(()) => info!(
                    destination = %publisher.destination(),
                    entry_count = count,
                    "📤 Published submission confirmation"
                ),
                Err(e) => error!(
                    destination = %publisher.destination(),
                    error = %e,
                    "Failed to publish submission confirmation"
                ),
            }
        }
    }
}
