//! # Submission Receipts
//!
//! The filing authority acknowledges each accepted submission with a receipt.
//! `SubmittedResult` pairs those receipts with the submitter contexts of the
//! bundle that was sent.

use crate::models::{Batch, SubmitterContext, TaxReturnIdAndSubmissionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Authority-assigned submission id the receipt refers to
    pub submission_id: String,
    pub receipt_id: String,
    pub received_at: DateTime<Utc>,
}

/// A receipt joined to the context it acknowledges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedEntry {
    pub context: SubmitterContext,
    pub receipt: SubmissionReceipt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedResult {
    pub batch: Batch,
    pub submitter_contexts: Vec<SubmitterContext>,
    pub receipts: Vec<SubmissionReceipt>,
}

impl SubmittedResult {
    pub fn new(
        batch: Batch,
        submitter_contexts: Vec<SubmitterContext>,
        receipts: Vec<SubmissionReceipt>,
    ) -> Self {
        Self {
            batch,
            submitter_contexts,
            receipts,
        }
    }

    /// Every submission in the bundle, receipted or not
    pub fn pending_submissions(&self) -> Vec<TaxReturnIdAndSubmissionId> {
        self.submitter_contexts
            .iter()
            .map(SubmitterContext::ids)
            .collect()
    }

    /// Receipts paired with their submitter context, in receipt order
    pub fn entries(&self) -> Vec<SubmittedEntry> {
        let by_submission_id: HashMap<&str, &SubmitterContext> = self
            .submitter_contexts
            .iter()
            .map(|context| (context.submission_id.as_str(), context))
            .collect();

        self.receipts
            .iter()
            .filter_map(|receipt| match by_submission_id.get(receipt.submission_id.as_str()) {
                Some(context) => Some(SubmittedEntry {
                    context: (*context).clone(),
                    receipt: receipt.clone(),
                }),
                None => {
                    warn!(
                        batch_path = %self.batch.path,
                        submission_id = %receipt.submission_id,
                        "Receipt does not match any submission in the bundle"
                    );
                    None
                }
            })
            .collect()
    }
}
