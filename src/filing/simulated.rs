//! # Simulated Filing Authority
//!
//! Accepts every bundle after a configurable latency and fabricates one
//! receipt per archive: a random receipt id, received at midnight UTC of the
//! archive's postmark. Outages and rejections can be switched on at runtime
//! so the executor's failure branches can be driven end to end.

use super::{FilingAuthorityClient, FilingError, FilingResult};
use crate::config::FilingAuthorityConfig;
use crate::logging::redact_tail;
use crate::models::{BundledArchives, SubmissionArchive, SubmissionReceipt};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct CallCounts {
    logins: AtomicUsize,
    submits: AtomicUsize,
    logouts: AtomicUsize,
}

#[derive(Debug)]
pub struct SimulatedFilingClient {
    session_id: RwLock<String>,
    latency: Duration,
    fail_login: AtomicBool,
    fail_logout: AtomicBool,
    reject_submissions: AtomicBool,
    unreachable: AtomicBool,
    calls: CallCounts,
    submitted: Mutex<Vec<Vec<String>>>,
}

impl Default for SimulatedFilingClient {
    fn default() -> Self {
        Self::new("", Duration::ZERO)
    }
}

impl SimulatedFilingClient {
    pub fn new(session_id: impl Into<String>, latency: Duration) -> Self {
        Self {
            session_id: RwLock::new(session_id.into()),
            latency,
            fail_login: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            reject_submissions: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
            calls: CallCounts::default(),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &FilingAuthorityConfig) -> Self {
        Self::new(config.session_id.clone(), config.simulated_latency())
    }

    /// Every call fails with a connectivity error while set
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn set_fail_login(&self, fail: bool) {
        self.fail_login.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    pub fn set_reject_submissions(&self, reject: bool) {
        self.reject_submissions.store(reject, Ordering::SeqCst);
    }

    pub fn session_id(&self) -> String {
        self.session_id.read().clone()
    }

    pub fn login_count(&self) -> usize {
        self.calls.logins.load(Ordering::SeqCst)
    }

    pub fn submit_count(&self) -> usize {
        self.calls.submits.load(Ordering::SeqCst)
    }

    pub fn logout_count(&self) -> usize {
        self.calls.logouts.load(Ordering::SeqCst)
    }

    /// Submission ids of every accepted bundle, in submit order
    pub fn submitted_bundles(&self) -> Vec<Vec<String>> {
        self.submitted.lock().clone()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn check_reachable(&self, operation: &str) -> FilingResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(FilingError::connectivity(operation, "simulated outage"));
        }
        Ok(())
    }

    fn fabricate_receipt(archive: &SubmissionArchive) -> SubmissionReceipt {
        let received_at = archive
            .postmark
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .unwrap_or_else(Utc::now);
        SubmissionReceipt {
            submission_id: archive.context.submission_id.clone(),
            receipt_id: Uuid::new_v4().to_string(),
            received_at,
        }
    }
}

#[async_trait]
impl FilingAuthorityClient for SimulatedFilingClient {
    async fn login(&self) -> FilingResult<()> {
        self.calls.logins.fetch_add(1, Ordering::SeqCst);
        self.check_reachable("login")?;
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(FilingError::login_failed("simulated credential failure"));
        }
        debug!(
            session_id = %redact_tail(&self.session_id.read()),
            "Simulated login"
        );
        Ok(())
    }

    async fn submit(&self, bundle: &BundledArchives) -> FilingResult<Vec<SubmissionReceipt>> {
        self.calls.submits.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.check_reachable("submit")?;
        if self.reject_submissions.load(Ordering::SeqCst) {
            return Err(FilingError::rejected(format!(
                "bundle {} failed schema validation",
                bundle.bundle_id
            )));
        }

        let receipts: Vec<SubmissionReceipt> =
            bundle.archives.iter().map(Self::fabricate_receipt).collect();
        self.submitted.lock().push(
            bundle
                .submitter_contexts
                .iter()
                .map(|c| c.submission_id.clone())
                .collect(),
        );

        info!(
            bundle_id = %bundle.bundle_id,
            receipts = receipts.len(),
            "📨 Simulated filing authority accepted bundle"
        );
        Ok(receipts)
    }

    async fn logout(&self) -> FilingResult<()> {
        self.calls.logouts.fetch_add(1, Ordering::SeqCst);
        self.check_reachable("logout")?;
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(FilingError::logout_failed("simulated session teardown failure"));
        }
        Ok(())
    }

    fn apply_session_id(&self, session_id: &str) {
        *self.session_id.write() = session_id.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmitterContext;
    use chrono::NaiveDate;

    fn bundle() -> BundledArchives {
        let context = SubmitterContext::new("sub-1", "user-1", Uuid::new_v4(), "2025-02-10");
        BundledArchives::new(vec![SubmissionArchive {
            context,
            manifest_xml: "<m/>".to_string(),
            return_xml: "<r/>".to_string(),
            postmark: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
        }])
    }

    #[tokio::test]
    async fn test_receipts_use_postmark() {
        let client = SimulatedFilingClient::default();
        let receipts = client.submit(&bundle()).await.unwrap();

        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].submission_id, "sub-1");
        assert_eq!(
            receipts[0].received_at,
            Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap()
        );
        assert!(Uuid::parse_str(&receipts[0].receipt_id).is_ok());
        assert_eq!(client.submitted_bundles(), vec![vec!["sub-1".to_string()]]);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let client = SimulatedFilingClient::default();

        client.set_reject_submissions(true);
        assert!(matches!(
            client.submit(&bundle()).await,
            Err(FilingError::Rejected { .. })
        ));

        client.set_unreachable(true);
        assert!(matches!(
            client.logout().await,
            Err(FilingError::Connectivity { .. })
        ));
        assert_eq!(client.logout_count(), 1);

        client.set_unreachable(false);
        client.set_fail_login(true);
        assert!(client.login().await.is_err());
        assert!(client.logout().await.is_ok());
    }

    #[test]
    fn test_apply_session_id() {
        let client = SimulatedFilingClient::new("default-session", Duration::ZERO);
        client.apply_session_id("override-42");
        assert_eq!(client.session_id(), "override-42");
    }
}
