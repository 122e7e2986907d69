//! Layered error definitions
//!
//! Categorized by where the failure is detected: transport state, dispatch
//! routing, payload validation, record layout.

use thiserror::Error;

use crate::RequestId;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Transport Errors =====
    /// Host call attempted before the transport was opened
    #[error("transport not ready: {operation} called before initialize")]
    TransportNotReady { operation: String },

    // ===== Dispatch Errors =====
    /// Response carries a request identifier no record is registered for
    #[error("unmatched response: no record registered for request {request_id}")]
    UnmatchedResponse { request_id: RequestId },

    /// Response payload size differs from the registered record size
    #[error("size mismatch for '{name}': expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    // ===== Layout Errors =====
    /// Field descriptors do not describe the bound record
    #[error("invalid layout for '{name}': {message}")]
    InvalidLayout { name: String, message: String },

    // ===== General Errors =====
    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create transport-not-ready error
    pub fn transport_not_ready(operation: impl Into<String>) -> Self {
        Self::TransportNotReady {
            operation: operation.into(),
        }
    }

    /// Create size mismatch error
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Create invalid layout error
    pub fn invalid_layout(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            name: name.into(),
            message: message.into(),
        }
    }
}
