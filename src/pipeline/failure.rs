//! # Stage Failures
//!
//! Collaborator failures are classified once, where they happen, into a
//! `FailureKind`; the executor branches on that value.

use super::action::ActionKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Filing authority unreachable: trip offline mode, retry the action verbatim
    Connectivity,
    /// Authority reachable but refused the content: split or report FAILED
    ContentRejection,
    /// Archive or bundle could not be built locally
    LocalFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Connectivity => "connectivity",
            FailureKind::ContentRejection => "content_rejection",
            FailureKind::LocalFailure => "local_failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("{kind} failure in {stage}: {message}")]
    Classified {
        stage: ActionKind,
        kind: FailureKind,
        message: String,
    },

    /// Anything the pipeline has no recovery branch for; the batch stays in progress
    #[error("Unclassified failure in {stage}: {message}")]
    Unclassified { stage: ActionKind, message: String },
}

impl StageError {
    pub fn connectivity(stage: ActionKind, message: impl Into<String>) -> Self {
        Self::Classified {
            stage,
            kind: FailureKind::Connectivity,
            message: message.into(),
        }
    }

    pub fn content_rejection(stage: ActionKind, message: impl Into<String>) -> Self {
        Self::Classified {
            stage,
            kind: FailureKind::ContentRejection,
            message: message.into(),
        }
    }

    pub fn local_failure(stage: ActionKind, message: impl Into<String>) -> Self {
        Self::Classified {
            stage,
            kind: FailureKind::LocalFailure,
            message: message.into(),
        }
    }

    pub fn unclassified(stage: ActionKind, message: impl Into<String>) -> Self {
        Self::Unclassified {
            stage,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            StageError::Classified { kind, .. } => Some(*kind),
            StageError::Unclassified { .. } => None,
        }
    }

    pub fn stage(&self) -> ActionKind {
        match self {
            StageError::Classified { stage, .. } | StageError::Unclassified { stage, .. } => *stage,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StageError::Classified { message, .. } | StageError::Unclassified { message, .. } => {
                message
            }
        }
    }
}
