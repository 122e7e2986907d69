//! # Data Manager
//!
//! Per-frame synchronization of host variables and records.
//!
//! Responsibilities:
//! - Own every variable and record handle created by the modules
//! - Refresh auto-read handles before the modules run
//! - Flush dirty auto-write handles after the modules ran
//! - Route asynchronous record responses back to their handle
//!
//! ## Usage
//!
//! ```ignore
//! use data_manager::{DataManager, VariablePolicy};
//!
//! let mut manager = DataManager::new(Default::default());
//! manager.initialize(Box::new(transport))?;
//!
//! let ready = manager.make_named_variable("A32NX_IS_READY", Unit::Number, VariablePolicy::auto_read());
//!
//! // every frame
//! manager.pre_update(&frame)?;
//! let _ = ready.get();
//! manager.post_update(&frame)?;
//! ```

mod aircraft_variable;
mod cache;
mod data_definition;
mod error;
mod manager;
mod named_variable;
mod variable;

pub use aircraft_variable::{AircraftVariable, AircraftVariablePtr};
pub use cache::VariablePolicy;
pub use data_definition::{DataDefinitionVariable, DataDefinitionVariablePtr};
pub use error::{DataManagerError, Result};
pub use manager::DataManager;
pub use named_variable::{NamedVariable, NamedVariablePtr};
pub use variable::{ManagedVariable, SimObjectRecord};

// Re-export contracts types
pub use contracts::{
    DataManagerConfig, DefinitionId, FieldDescriptor, FrameContext, FrameStats, RequestId, Unit,
    VariableKey,
};
