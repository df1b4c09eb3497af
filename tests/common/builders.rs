//! Harness and message builders for pipeline integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use submit_core::config::SubmitConfig;
use submit_core::filing::{SimulatedFilingClient, StaticIdentityLookup};
use submit_core::messaging::{MessagePublisher, RecordingPublisher};
use submit_core::service::{ServiceCollaborators, SubmitService};
use submit_core::storage::{InMemoryObjectStore, ManualClock};
use uuid::Uuid;

pub const WORKER_ID: &str = "it-worker";
pub const SIGN_DATE: &str = "2025-03-30";

/// Everything a test needs to drive and inspect one service instance
pub struct TestHarness {
    pub service: SubmitService,
    pub store: Arc<InMemoryObjectStore>,
    pub clock: Arc<ManualClock>,
    pub filing: Arc<SimulatedFilingClient>,
    pub pending: Arc<RecordingPublisher>,
    pub confirmations: Arc<RecordingPublisher>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send one v1 dispatch message through the consumer
    pub async fn dispatch(&self, submission_id: &str) {
        self.dispatch_raw(&DispatchBuilder::new(submission_id).build())
            .await;
    }

    pub async fn dispatch_raw(&self, raw: &str) {
        self.service
            .consumer()
            .on_message(raw)
            .await
            .expect("dispatch should be accepted");
    }

    /// Confirmation entries across every published confirmation message
    pub fn confirmation_entries(&self) -> Vec<Value> {
        self.confirmations
            .json_messages()
            .into_iter()
            .flat_map(|message| {
                message["payload"]["entries"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}

pub struct TestHarnessBuilder {
    config: SubmitConfig,
    store: Option<Arc<InMemoryObjectStore>>,
    clock: Option<Arc<ManualClock>>,
    identity: StaticIdentityLookup,
}

impl TestHarnessBuilder {
    pub fn new() -> Self {
        let mut config = SubmitConfig::default();
        config.worker.worker_id = WORKER_ID.to_string();
        config.batching.max_batch_size = 3;
        config.batching.batch_timeout_ms = 60_000;
        Self {
            config,
            store: None,
            clock: None,
            identity: StaticIdentityLookup::default(),
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.config.batching.max_batch_size = max_batch_size;
        self
    }

    /// Shrink every scheduled interval so a started service reacts within milliseconds
    pub fn with_fast_schedule(mut self) -> Self {
        self.config.batching.batch_timeout_ms = 50;
        self.config.batching.old_batch_interval_ms = 100;
        self.config.batching.error_polling_ms = 100;
        self.config.batching.error_polling_initial_delay_ms = 10;
        self.config.executor.offline_probe_interval_ms = 20;
        self
    }

    pub fn with_submit_enabled(mut self, enabled: bool) -> Self {
        self.config.filing_authority.submit_enabled = enabled;
        self
    }

    pub fn with_publishing(mut self, pending: bool, confirmations: bool) -> Self {
        self.config.messaging.pending_submission_publish_enabled = pending;
        self.config.messaging.submission_confirmation_publish_enabled = confirmations;
        self
    }

    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.config.filing_authority.session_id = session_id.to_string();
        self
    }

    pub fn with_identity_override(mut self, session_id: &str) -> Self {
        self.identity = self.identity.with_override(WORKER_ID, session_id);
        self
    }

    /// Reuse storage and clock from an earlier harness, as a restarted worker would
    pub fn restarted_from(mut self, previous: &TestHarness) -> Self {
        self.store = Some(previous.store.clone());
        self.clock = Some(previous.clock.clone());
        self
    }

    pub async fn build(self) -> TestHarness {
        let clock = self.clock.unwrap_or_else(|| {
            Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap(),
            ))
        });
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryObjectStore::with_clock(clock.clone())));
        let filing = Arc::new(SimulatedFilingClient::from_config(
            &self.config.filing_authority,
        ));
        let pending = Arc::new(RecordingPublisher::new("pending-submission"));
        let confirmations = Arc::new(RecordingPublisher::new("submission-confirmation"));

        let service = SubmitService::new(
            self.config,
            ServiceCollaborators {
                store: store.clone(),
                clock: clock.clone(),
                filing_client: filing.clone(),
                identity: Arc::new(self.identity),
                pending_submission_publisher: pending.clone(),
                confirmation_publishers: vec![confirmations.clone() as Arc<dyn MessagePublisher>],
            },
        )
        .expect("test configuration should be valid");
        service
            .initialize()
            .await
            .expect("service should initialize");

        TestHarness {
            service,
            store,
            clock,
            filing,
            pending,
            confirmations,
        }
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses
pub async fn wait_until(timeout: std::time::Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    condition()
}

/// Builder for raw dispatch message bodies
pub struct DispatchBuilder {
    version: Option<String>,
    submission_id: String,
    tax_return_id: Uuid,
    sign_date: String,
    manifest_xml: String,
    return_xml: String,
}

impl DispatchBuilder {
    pub fn new(submission_id: &str) -> Self {
        Self {
            version: Some("1".to_string()),
            submission_id: submission_id.to_string(),
            tax_return_id: Uuid::new_v4(),
            sign_date: SIGN_DATE.to_string(),
            manifest_xml: format!("<manifest id=\"{submission_id}\"/>"),
            return_xml: format!("<return id=\"{submission_id}\"/>"),
        }
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_string);
        self
    }

    pub fn with_tax_return_id(mut self, tax_return_id: Uuid) -> Self {
        self.tax_return_id = tax_return_id;
        self
    }

    pub fn with_manifest_xml(mut self, manifest_xml: &str) -> Self {
        self.manifest_xml = manifest_xml.to_string();
        self
    }

    pub fn build(self) -> String {
        let headers = match self.version {
            Some(version) => json!({ "version": version }),
            None => json!({}),
        };
        json!({
            "headers": headers,
            "payload": {
                "submissionId": self.submission_id,
                "userId": format!("user-{}", self.submission_id),
                "taxReturnId": self.tax_return_id,
                "signDate": self.sign_date,
                "manifestXml": self.manifest_xml,
                "returnXml": self.return_xml,
            }
        })
        .to_string()
    }
}
