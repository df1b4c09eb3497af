//! # Messaging Module
//!
//! Inbound dispatch decoding and outbound notification publishing, all over
//! versioned JSON envelopes.

pub mod dispatch;
pub mod envelope;
pub mod errors;
pub mod outbound;
pub mod publisher;

pub use dispatch::{decode_dispatch, DispatchConsumer, DispatchPayloadV1};
pub use envelope::{MessageHeaders, VersionedMessage};
pub use errors::{MessagingError, MessagingResult};
pub use outbound::{
    ConfirmationReceipt, FailureMetadata, PendingSubmissionPayloadV1,
    SubmissionConfirmationEntry, SubmissionConfirmationPayloadV2,
};
pub use publisher::{MessagePublisher, NotificationService, RecordingPublisher};
