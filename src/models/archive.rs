//! Archive and bundle values produced by the CreateArchive and BundleArchive stages.

use crate::models::SubmitterContext;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submission packaged for the filing authority, postmarked with its sign date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionArchive {
    pub context: SubmitterContext,
    pub manifest_xml: String,
    pub return_xml: String,
    pub postmark: NaiveDate,
}

/// Per-batch aggregate handed from Bundle to Submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundledArchives {
    pub bundle_id: Uuid,
    /// Submitter contexts in archive order
    pub submitter_contexts: Vec<SubmitterContext>,
    pub archives: Vec<SubmissionArchive>,
}

impl BundledArchives {
    pub fn new(archives: Vec<SubmissionArchive>) -> Self {
        let submitter_contexts = archives.iter().map(|a| a.context.clone()).collect();
        Self {
            bundle_id: Uuid::new_v4(),
            submitter_contexts,
            archives,
        }
    }

    pub fn len(&self) -> usize {
        self.submitter_contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submitter_contexts.is_empty()
    }
}
