//! # Host Client
//!
//! Host transport abstraction.
//!
//! Responsibilities:
//! - Define the `HostTransport` contract the data manager drives
//! - Map host failures into `HostError`
//! - Provide `MockHostTransport` for tests and offline runs

pub mod client;
pub mod error;
pub mod mock_client;

pub use client::HostTransport;
pub use contracts::{HostException, HostMessage, SimObjectData};
pub use error::{HostError, Result};
pub use mock_client::{MockCallCounts, MockHostConfig, MockHostTransport};
