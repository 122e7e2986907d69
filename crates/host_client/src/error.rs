//! Host transport error types

use contracts::ContractError;
use thiserror::Error;

/// Host transport specific error
#[derive(Debug, Error)]
pub enum HostError {
    /// Call attempted on a closed transport
    #[error("host transport is not open")]
    NotOpen,

    /// `open` called twice
    #[error("host transport is already open")]
    AlreadyOpen,

    /// Opening the connection failed
    #[error("failed to connect to host: {message}")]
    ConnectionFailed { message: String },

    /// Host refused a read, write or request
    #[error("host rejected {operation} for '{target}': {message}")]
    Rejected {
        operation: &'static str,
        target: String,
        message: String,
    },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl HostError {
    /// Create rejected-call error
    pub fn rejected(
        operation: &'static str,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            operation,
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, HostError>;
