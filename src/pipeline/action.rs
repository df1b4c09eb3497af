//! # Pipeline Actions
//!
//! One variant per stage. Each payload carries exactly what its stage needs;
//! actions are immutable values moved through the queue.

use crate::models::{Batch, BundledArchives, SubmissionArchive};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateArchive,
    BundleArchive,
    SubmitBundle,
    SubmissionFailure,
    Cleanup,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::CreateArchive => "create_archive",
            ActionKind::BundleArchive => "bundle_archive",
            ActionKind::SubmitBundle => "submit_bundle",
            ActionKind::SubmissionFailure => "submission_failure",
            ActionKind::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Which queue lane an action belongs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Batches not yet started
    New,
    /// Follow-up work for batches already in the pipeline
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateArchiveAction {
    pub batch: Batch,
}

/// Result of CreateArchive: the batch plus one archive per stored submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArchiveAction {
    pub batch: Batch,
    pub archives: Vec<SubmissionArchive>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBundleAction {
    pub batch: Batch,
    pub bundle: BundledArchives,
}

/// A rejected multi-submission batch waiting to be split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFailureAction {
    pub batch: Batch,
    pub bundle: BundledArchives,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupAction {
    pub batch: Batch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateArchive(CreateArchiveAction),
    BundleArchive(BundleArchiveAction),
    SubmitBundle(SubmitBundleAction),
    SubmissionFailure(SubmissionFailureAction),
    Cleanup(CleanupAction),
}

impl Action {
    pub fn create_archive(batch: Batch) -> Self {
        Action::CreateArchive(CreateArchiveAction { batch })
    }

    pub fn bundle_archive(batch: Batch, archives: Vec<SubmissionArchive>) -> Self {
        Action::BundleArchive(BundleArchiveAction { batch, archives })
    }

    pub fn submit_bundle(batch: Batch, bundle: BundledArchives) -> Self {
        Action::SubmitBundle(SubmitBundleAction { batch, bundle })
    }

    pub fn submission_failure(
        batch: Batch,
        bundle: BundledArchives,
        error_message: impl Into<String>,
    ) -> Self {
        Action::SubmissionFailure(SubmissionFailureAction {
            batch,
            bundle,
            error_message: error_message.into(),
        })
    }

    pub fn cleanup(batch: Batch) -> Self {
        Action::Cleanup(CleanupAction { batch })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateArchive(_) => ActionKind::CreateArchive,
            Action::BundleArchive(_) => ActionKind::BundleArchive,
            Action::SubmitBundle(_) => ActionKind::SubmitBundle,
            Action::SubmissionFailure(_) => ActionKind::SubmissionFailure,
            Action::Cleanup(_) => ActionKind::Cleanup,
        }
    }

    pub fn batch(&self) -> &Batch {
        match self {
            Action::CreateArchive(a) => &a.batch,
            Action::BundleArchive(a) => &a.batch,
            Action::SubmitBundle(a) => &a.batch,
            Action::SubmissionFailure(a) => &a.batch,
            Action::Cleanup(a) => &a.batch,
        }
    }

    pub fn lane(&self) -> Lane {
        match self {
            Action::CreateArchive(_) => Lane::New,
            _ => Lane::InProgress,
        }
    }
}
