//! Command implementations.

mod exception;
mod run;

pub use exception::run_exception;
pub use run::run_frames;
