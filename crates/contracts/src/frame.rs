//! Per-frame context and statistics

use serde::{Deserialize, Serialize};

/// Data the host hands to every frame phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameContext {
    /// Absolute simulation time (seconds)
    pub sim_time: f64,
    /// Time since the previous frame (seconds)
    pub delta_time: f64,
}

impl FrameContext {
    pub fn new(sim_time: f64, delta_time: f64) -> Self {
        Self {
            sim_time,
            delta_time,
        }
    }

    /// Context of the frame following this one with the same delta
    pub fn next(&self) -> Self {
        Self {
            sim_time: self.sim_time + self.delta_time,
            delta_time: self.delta_time,
        }
    }
}

/// Host interaction counts of a single frame (pre- and post-update)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Tick counter value of the frame
    pub tick: u64,
    /// Scalar host reads performed
    pub host_reads: u32,
    /// Scalar and record host writes performed
    pub host_writes: u32,
    /// Record requests issued
    pub record_requests: u32,
    /// Messages drained from the transport
    pub messages: u32,
    /// Record responses routed to a handle
    pub routed_responses: u32,
    /// Responses with no matching request identifier
    pub unmatched_responses: u32,
    /// Responses rejected for a payload size mismatch
    pub size_mismatches: u32,
    /// Host calls that failed (read, write or request)
    pub host_failures: u32,
    /// Host exception notifications received
    pub exceptions: u32,
}
