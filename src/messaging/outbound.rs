//! # Outbound Notifications
//!
//! Payloads published after a batch leaves the pipeline: the pending-submission
//! notice (v1) listing every submission sent to the filing authority, and the
//! submission confirmation (v2) reporting SUBMITTED or FAILED per submission.

use super::{MessagingResult, VersionedMessage};
use crate::constants::messages::{PENDING_SUBMISSION_V1, SUBMISSION_CONFIRMATION_V2};
use crate::constants::{FailureCategory, FailureDetail, SubmissionEventType};
use crate::models::{SubmittedEntry, SubmitterContext, TaxReturnIdAndSubmissionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmissionPayloadV1 {
    pub pending_submissions: Vec<TaxReturnIdAndSubmissionId>,
}

impl PendingSubmissionPayloadV1 {
    pub fn to_message_json(&self) -> MessagingResult<String> {
        VersionedMessage::new(PENDING_SUBMISSION_V1, self).to_json_string()
    }
}

/// Receipt as reported downstream; FAILED entries carry no receipt id or timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationReceipt {
    pub tax_return_id: Uuid,
    pub submission_id: String,
    pub receipt_id: Option<String>,
    pub submission_received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureMetadata {
    pub error_message: String,
    pub failure_category: FailureCategory,
    pub failure_detail: FailureDetail,
}

impl FailureMetadata {
    /// Processing failure with the standard category and detail
    pub fn processing(error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            failure_category: FailureCategory::Processing,
            failure_detail: FailureDetail::SubmissionProcessing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionConfirmationEntry {
    pub receipt: ConfirmationReceipt,
    pub event_type: SubmissionEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_metadata: Option<FailureMetadata>,
}

impl SubmissionConfirmationEntry {
    pub fn submitted(entry: &SubmittedEntry) -> Self {
        Self {
            receipt: ConfirmationReceipt {
                tax_return_id: entry.context.tax_return_id,
                submission_id: entry.receipt.submission_id.clone(),
                receipt_id: Some(entry.receipt.receipt_id.clone()),
                submission_received_at: Some(entry.receipt.received_at),
            },
            event_type: SubmissionEventType::Submitted,
            failure_metadata: None,
        }
    }

    pub fn failed(context: &SubmitterContext, metadata: FailureMetadata) -> Self {
        Self {
            receipt: ConfirmationReceipt {
                tax_return_id: context.tax_return_id,
                submission_id: context.submission_id.clone(),
                receipt_id: None,
                submission_received_at: None,
            },
            event_type: SubmissionEventType::Failed,
            failure_metadata: Some(metadata),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionConfirmationPayloadV2 {
    pub entries: Vec<SubmissionConfirmationEntry>,
}

impl SubmissionConfirmationPayloadV2 {
    pub fn to_message_json(&self) -> MessagingResult<String> {
        VersionedMessage::new(SUBMISSION_CONFIRMATION_V2, self).to_json_string()
    }
}
