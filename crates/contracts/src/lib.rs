//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the bridge: variable
//! keys, host identifiers, record layouts, host messages and configuration.
//! Business crates depend on this crate only, never the other way around.
//!
//! ## Time Model
//! - Uses the host simulation time (seconds, f64) as primary clock
//! - The frame tick counter is owned by the data manager and starts at 1
//!   on the first `pre_update`

mod config;
mod error;
mod exception;
mod frame;
mod ids;
mod message;
mod record;
mod unit;
mod variable_key;

pub use config::*;
pub use error::*;
pub use exception::HostException;
pub use frame::*;
pub use ids::*;
pub use message::*;
pub use record::*;
pub use unit::Unit;
pub use variable_key::VariableKey;
