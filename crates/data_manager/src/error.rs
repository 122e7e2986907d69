//! Data manager error types

use contracts::ContractError;
use host_client::HostError;
use thiserror::Error;

/// Data manager specific error
#[derive(Debug, Error)]
pub enum DataManagerError {
    /// Write attempted on a variable without a setter path
    #[error("variable '{name}' is read-only")]
    ReadOnly { name: String },

    /// Host call failed
    #[error(transparent)]
    Host(#[from] HostError),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl DataManagerError {
    /// Frame phase or host call before `initialize` (or after `shutdown`)
    pub fn not_ready(operation: &str) -> Self {
        Self::Contract(ContractError::transport_not_ready(operation))
    }

    /// Create read-only error
    pub fn read_only(name: impl Into<String>) -> Self {
        Self::ReadOnly { name: name.into() }
    }

    /// Whether this is a transport-not-ready error
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            Self::Contract(ContractError::TransportNotReady { .. })
        )
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, DataManagerError>;
