//! Capability traits shared by every handle kind.
//!
//! The manager stores handles behind these traits so it can refresh and
//! flush scalars and records uniformly.

use contracts::{DefinitionId, RequestId, SimObjectData, VariableKey};
use host_client::HostTransport;

use crate::error::Result;

/// A host value cached locally and synchronized by the data manager
pub trait ManagedVariable {
    /// Registry key (`name` or `name:index`)
    fn key(&self) -> &VariableKey;

    /// Refreshed automatically before the modules run
    fn is_auto_read(&self) -> bool;

    /// Flushed automatically after the modules ran
    fn is_auto_write(&self) -> bool;

    /// Local value differs from what was last written to the host
    fn is_dirty(&self) -> bool;

    /// Last synchronization is young enough under the handle's max ages
    fn is_fresh(&self, time: f64, tick: u64) -> bool;

    /// Unconditional read from the host
    ///
    /// Records only issue the request here; the value arrives later as a
    /// dispatched response.
    fn read_from_sim(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<()>;

    /// Unconditional write to the host
    fn write_to_sim(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<()>;

    /// Auto-read pass: read if auto-read and stale
    ///
    /// Returns whether the host was called. On failure the cached value is
    /// kept. A local value still waiting for the auto-write pass is never
    /// replaced by a read.
    fn refresh(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<bool> {
        if !self.is_auto_read() || self.is_fresh(time, tick) || self.has_pending_write() {
            return Ok(false);
        }
        self.read_from_sim(host, time, tick)?;
        Ok(true)
    }

    /// Dirty and due to be flushed by the auto-write pass
    fn has_pending_write(&self) -> bool {
        self.is_auto_write() && self.is_dirty()
    }

    /// Auto-write pass: write if auto-write and dirty
    ///
    /// Returns whether the host was called.
    fn flush(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<bool> {
        if !self.has_pending_write() {
            return Ok(false);
        }
        self.write_to_sim(host, time, tick)?;
        Ok(true)
    }
}

/// A multi-field record synchronized as one unit
pub trait SimObjectRecord: ManagedVariable {
    /// Human-readable record name
    fn name(&self) -> &str;

    /// Identifier of the registered field layout
    fn definition_id(&self) -> DefinitionId;

    /// Identifier responses to this record's requests carry
    fn request_id(&self) -> RequestId;

    /// Size of the bound native record in bytes
    fn record_size(&self) -> usize;

    /// A request was issued and its answer has not arrived yet
    fn is_pending(&self) -> bool;

    /// Copy a matched response into the bound record
    ///
    /// The caller has already matched the request identifier. A payload of
    /// the wrong size is rejected without touching the record.
    fn update_from_sim_object_data(&self, data: &SimObjectData) -> Result<()>;
}
