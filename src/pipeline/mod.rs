//! # Action Pipeline
//!
//! A batch moves through the pipeline as a sequence of tagged actions on a
//! shared two-lane queue:
//!
//! ```text
//! CreateArchive → BundleArchive → SubmitBundle → Cleanup
//!                       │               │
//!                       │               ├─ rejected (n > 1) → SubmissionFailure → Cleanup
//!                       │               ├─ rejected (n = 1) → FAILED confirmation → Cleanup
//!                       │               └─ unreachable → offline mode + same SubmitBundle re-queued
//!                       └─ bundling failed → FAILED confirmations → Cleanup
//! ```
//!
//! The in-progress set owns a batch from the moment its CreateArchive is
//! queued until its Cleanup runs.

pub mod action;
pub mod executor;
pub mod failure;
pub mod in_progress;
pub mod queue;
pub mod stages;
pub mod stats;

pub use action::{Action, ActionKind, Lane};
pub use executor::{ActionExecutor, ExecutorContext};
pub use failure::{FailureKind, StageError};
pub use in_progress::InProgressBatches;
pub use queue::ActionQueue;
pub use stats::{PipelineStats, PipelineStatsSnapshot};
