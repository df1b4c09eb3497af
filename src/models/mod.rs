//! # Domain Models
//!
//! Immutable values that flow through the submission pipeline: submissions
//! and their submitter context, batches, archives and bundles, and the
//! filing authority's receipts.

pub mod archive;
pub mod batch;
pub mod receipt;
pub mod submission;

pub use archive::{BundledArchives, SubmissionArchive};
pub use batch::Batch;
pub use receipt::{SubmissionReceipt, SubmittedEntry, SubmittedResult};
pub use submission::{
    StoredSubmitterContext, Submission, SubmitterContext, TaxReturnIdAndSubmissionId,
};
