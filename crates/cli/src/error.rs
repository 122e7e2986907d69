//! Error types for CLI operations.

use modules::ModuleError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Argument outside its valid range
    #[error("Invalid value for --{name}: {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// Frame driver failure
    #[error("Frame loop failed: {0}")]
    Driver(#[from] ModuleError),
}

impl CliError {
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
