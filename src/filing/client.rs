use super::FilingResult;
use crate::models::{BundledArchives, SubmissionReceipt};
use async_trait::async_trait;
use std::fmt::Debug;

/// Session-oriented client for the filing authority.
///
/// A submit round-trip is `login` → `submit` → `logout`. The executor also
/// uses `logout` on its own as a liveness probe, so implementations must
/// tolerate a logout without a preceding successful login.
#[async_trait]
pub trait FilingAuthorityClient: Send + Sync + Debug {
    async fn login(&self) -> FilingResult<()>;

    /// Transmit a bundle, returning one receipt per accepted submission
    async fn submit(&self, bundle: &BundledArchives) -> FilingResult<Vec<SubmissionReceipt>>;

    async fn logout(&self) -> FilingResult<()>;

    /// Replace the session id used by subsequent logins
    fn apply_session_id(&self, session_id: &str);
}
