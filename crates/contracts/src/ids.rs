//! Host identifier space
//!
//! Data definitions and requests are tagged with identifiers drawn from a
//! single monotonically increasing space. Identifiers are never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered record layout (field shape)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefinitionId(pub u64);

/// Identifier of a record subscription; responses carry it back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues unique identifiers for host requests.
///
/// Owned by the data manager rather than living in a global, so tests can
/// create a fresh generator per scenario. The 64-bit space is not expected
/// to wrap within a process lifetime.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// First identifier handed out by a fresh generator
    pub const FIRST_ID: u64 = 1;

    pub fn new() -> Self {
        Self {
            next: Self::FIRST_ID,
        }
    }

    /// Return the next identifier and advance the counter
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Identifier that the next call to `next_id` will return
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Start over from `FIRST_ID`
    pub fn reset(&mut self) {
        self.next = Self::FIRST_ID;
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
