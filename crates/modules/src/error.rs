//! Module error types

use data_manager::DataManagerError;
use thiserror::Error;

/// Module specific error
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A module phase failed
    #[error("module '{module}' failed in {phase}: {message}")]
    Failed {
        module: String,
        phase: &'static str,
        message: String,
    },

    /// The driver could not be initialized
    #[error("frame driver initialization failed: {0}")]
    Initialization(String),

    /// Wrapped DataManagerError
    #[error(transparent)]
    DataManager(#[from] DataManagerError),
}

impl ModuleError {
    /// Create module failure error
    pub fn failed(
        module: impl Into<String>,
        phase: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Failed {
            module: module.into(),
            phase,
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ModuleError>;
