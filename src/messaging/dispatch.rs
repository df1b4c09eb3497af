//! # Dispatch Consumer
//!
//! Decodes inbound dispatch messages and hands each submission to the batch
//! assembler. Errors are returned to the transport so it can redeliver or
//! dead-letter the message.

use super::VersionedMessage;
use crate::batching::BatchAssembler;
use crate::constants::messages::{DISPATCH_MESSAGE_TYPE, DISPATCH_V1};
use crate::error::{SubmitError, SubmitResult};
use crate::models::{Submission, SubmitterContext};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Dispatch payload, version 1: the submitter context fields inline with the
/// two authority-ready documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchPayloadV1 {
    #[serde(flatten)]
    pub submitter_context: SubmitterContext,
    pub manifest_xml: String,
    pub return_xml: String,
}

impl From<DispatchPayloadV1> for Submission {
    fn from(payload: DispatchPayloadV1) -> Self {
        Submission::new(
            payload.submitter_context,
            payload.manifest_xml,
            payload.return_xml,
        )
    }
}

/// Decode a raw dispatch message into a submission
pub fn decode_dispatch(raw: &str) -> SubmitResult<Submission> {
    let message = VersionedMessage::parse(raw)?;
    let version = message.required_version()?;

    match version {
        DISPATCH_V1 => {
            let payload: DispatchPayloadV1 = message.decode_payload()?;
            Ok(payload.into())
        }
        other => Err(handle_unsupported_version(other)),
    }
}

fn handle_unsupported_version(version: &str) -> SubmitError {
    error!(
        message_type = DISPATCH_MESSAGE_TYPE,
        version = %version,
        "Unsupported dispatch message version"
    );
    SubmitError::unsupported_version(DISPATCH_MESSAGE_TYPE, version)
}

#[derive(Debug, Clone)]
pub struct DispatchConsumer {
    assembler: Arc<BatchAssembler>,
}

impl DispatchConsumer {
    pub fn new(assembler: Arc<BatchAssembler>) -> Self {
        Self { assembler }
    }

    /// Handle one inbound message body
    pub async fn on_message(&self, raw: &str) -> SubmitResult<()> {
        let submission = decode_dispatch(raw)?;
        debug!(
            submission_id = %submission.submission_id(),
            tax_return_id = %submission.context.tax_return_id,
            "📥 Dispatch received"
        );
        self.assembler.add_submission(submission).await
    }
}
