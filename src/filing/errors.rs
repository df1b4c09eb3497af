//! # Filing Authority Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilingError {
    #[error("Login to filing authority failed: {message}")]
    LoginFailed { message: String },

    #[error("Logout from filing authority failed: {message}")]
    LogoutFailed { message: String },

    #[error("Submission rejected by filing authority: {message}")]
    Rejected { message: String },

    #[error("Filing authority unreachable: {operation}: {message}")]
    Connectivity { operation: String, message: String },

    #[error("Identity lookup failed for worker {worker_id}: {message}")]
    IdentityLookup { worker_id: String, message: String },
}

impl FilingError {
    pub fn login_failed(message: impl Into<String>) -> Self {
        Self::LoginFailed {
            message: message.into(),
        }
    }

    pub fn logout_failed(message: impl Into<String>) -> Self {
        Self::LogoutFailed {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn connectivity(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connectivity {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn identity_lookup(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IdentityLookup {
            worker_id: worker_id.into(),
            message: message.into(),
        }
    }
}

pub type FilingResult<T> = Result<T, FilingError>;
