//! # System Constants
//!
//! Storage layout, object names, message versions, and failure vocabularies
//! shared across the submission core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object-store layout for batch contents
pub mod storage {
    /// Root folder for everything the submission core writes
    pub const SUBMISSIONS_FOLDER: &str = "pre-submission-batching";
    /// Folder (under [`SUBMISSIONS_FOLDER`]) holding split copies of failed batches
    pub const ERRORS_FOLDER: &str = "errors";

    pub const MANIFEST_FILE: &str = "manifest.xml";
    pub const RETURN_FILE: &str = "submission.xml";
    pub const SUBMITTER_CONTEXT_FILE: &str = "userContext.json";

    /// Maximum number of keys removed per delete request during cleanup
    pub const MAX_OBJECTS_PER_DELETE: usize = 1000;
}

/// Header attribute names and supported versions for queue messages
pub mod messages {
    pub const VERSION_HEADER: &str = "version";

    pub const DISPATCH_V1: &str = "1";
    pub const PENDING_SUBMISSION_V1: &str = "1";
    pub const SUBMISSION_CONFIRMATION_V2: &str = "2";

    pub const DISPATCH_MESSAGE_TYPE: &str = "dispatch";
    pub const PENDING_SUBMISSION_MESSAGE_TYPE: &str = "pending_submission";
    pub const SUBMISSION_CONFIRMATION_MESSAGE_TYPE: &str = "submission_confirmation";
}

/// Outcome reported downstream for each submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionEventType {
    Submitted,
    Failed,
}

/// Broad category attached to FAILED confirmations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Processing,
}

/// Specific failure detail attached to FAILED confirmations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureDetail {
    SubmissionProcessing,
}

impl fmt::Display for SubmissionEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionEventType::Submitted => write!(f, "SUBMITTED"),
            SubmissionEventType::Failed => write!(f, "FAILED"),
        }
    }
}
