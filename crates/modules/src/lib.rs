//! # Modules
//!
//! Frame driver and the domain modules that consume data manager handles.
//!
//! Responsibilities:
//! - Define the module lifecycle (`initialize`, per-frame phases, `shutdown`)
//! - Drive the data manager and every module through one frame
//! - ARINC 429 variable bridge
//! - Pushback control

mod arinc429;
mod driver;
mod error;
mod module;
mod pushback;

pub use arinc429::{Arinc429LvarBridge, Arinc429Word, BridgePair, SignStatus};
pub use driver::FrameDriver;
pub use error::{ModuleError, Result};
pub use module::Module;
pub use pushback::{InertialDampener, Pushback, PushbackData, PushbackProfile};
