//! Frame loop orchestration module.

mod runner;
mod scenario;
mod stats;

pub use runner::{Runner, RunnerConfig};
pub use scenario::Scenario;
pub use stats::RunStats;
