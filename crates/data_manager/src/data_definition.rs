//! Data definition (record) handle
//!
//! A record is a `#[repr(C)]` struct whose fields map to host variables
//! through a list of [`FieldDescriptor`]s. The whole struct is requested and
//! written as one unit; responses arrive asynchronously and are routed here
//! by request identifier.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use bytemuck::Pod;
use contracts::{
    ContractError, DefinitionId, FieldDescriptor, RequestId, SimObjectData, VariableKey,
};
use host_client::HostTransport;
use tracing::{debug, instrument, trace};

use crate::cache::{SyncStamp, VariablePolicy};
use crate::error::Result;
use crate::variable::{ManagedVariable, SimObjectRecord};

/// Shared handle to a data definition
pub type DataDefinitionVariablePtr<T> = Rc<DataDefinitionVariable<T>>;

/// A record bound to the native struct `T`
pub struct DataDefinitionVariable<T: Pod> {
    key: VariableKey,
    fields: Vec<FieldDescriptor>,
    definition_id: DefinitionId,
    request_id: RequestId,
    policy: VariablePolicy,
    data: Cell<T>,
    dirty: Cell<bool>,
    pending: Cell<bool>,
    stamp: SyncStamp,
    requests: Cell<u64>,
    superseded: Cell<u64>,
    received: Cell<u64>,
}

impl<T: Pod> DataDefinitionVariable<T> {
    pub(crate) fn new(
        name: &str,
        fields: Vec<FieldDescriptor>,
        definition_id: DefinitionId,
        request_id: RequestId,
        initial: T,
        policy: VariablePolicy,
    ) -> Self {
        Self {
            key: VariableKey::named(name),
            fields,
            definition_id,
            request_id,
            policy,
            data: Cell::new(initial),
            dirty: Cell::new(false),
            pending: Cell::new(false),
            stamp: SyncStamp::default(),
            requests: Cell::new(0),
            superseded: Cell::new(0),
            received: Cell::new(0),
        }
    }

    /// Copy of the bound record
    #[inline]
    pub fn data(&self) -> T {
        self.data.get()
    }

    /// Replace the bound record and mark it dirty
    pub fn set_data(&self, data: T) {
        self.data.set(data);
        self.dirty.set(true);
    }

    /// Modify the bound record in place and mark it dirty
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut data = self.data.get();
        f(&mut data);
        self.set_data(data);
    }

    #[inline]
    pub fn policy(&self) -> &VariablePolicy {
        &self.policy
    }

    /// Requests issued to the host
    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }

    /// Requests replaced by a newer one before their answer arrived
    pub fn superseded_count(&self) -> u64 {
        self.superseded.get()
    }

    /// Responses copied into the record
    pub fn received_count(&self) -> u64 {
        self.received.get()
    }

    /// Simulation time of the last request or write
    pub fn time_stamp(&self) -> f64 {
        self.stamp.time()
    }

    /// Frame tick of the last request or write
    pub fn tick_stamp(&self) -> u64 {
        self.stamp.tick()
    }
}

impl<T: Pod> fmt::Debug for DataDefinitionVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataDefinitionVariable")
            .field("name", &self.key)
            .field("definition_id", &self.definition_id)
            .field("request_id", &self.request_id)
            .field("record_size", &std::mem::size_of::<T>())
            .field("fields", &self.fields.len())
            .field("pending", &self.pending.get())
            .field("dirty", &self.dirty.get())
            .finish()
    }
}

impl<T: Pod> ManagedVariable for DataDefinitionVariable<T> {
    fn key(&self) -> &VariableKey {
        &self.key
    }

    fn is_auto_read(&self) -> bool {
        self.policy.auto_read
    }

    fn is_auto_write(&self) -> bool {
        self.policy.auto_write
    }

    fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn is_fresh(&self, time: f64, tick: u64) -> bool {
        self.stamp.is_fresh(&self.policy, time, tick)
    }

    /// Issue a request tagged with this record's request identifier
    ///
    /// A request still unanswered is superseded; its answer, if it ever
    /// arrives, carries the same identifier and lands here too.
    #[instrument(level = "trace", name = "record_request", skip_all, fields(name = %self.key, request_id = %self.request_id))]
    fn read_from_sim(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<()> {
        host.request_record(self.request_id, self.definition_id)?;
        if self.pending.replace(true) {
            self.superseded.set(self.superseded.get() + 1);
            trace!("previous request superseded");
        }
        self.requests.set(self.requests.get() + 1);
        self.stamp.mark(time, tick);
        Ok(())
    }

    #[instrument(level = "trace", name = "record_write", skip_all, fields(name = %self.key, definition_id = %self.definition_id))]
    fn write_to_sim(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<()> {
        let data = self.data.get();
        host.write_record(self.definition_id, bytemuck::bytes_of(&data))?;
        self.dirty.set(false);
        self.stamp.mark(time, tick);
        Ok(())
    }
}

impl<T: Pod> SimObjectRecord for DataDefinitionVariable<T> {
    fn name(&self) -> &str {
        &self.key
    }

    fn definition_id(&self) -> DefinitionId {
        self.definition_id
    }

    fn request_id(&self) -> RequestId {
        self.request_id
    }

    fn record_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    fn is_pending(&self) -> bool {
        self.pending.get()
    }

    fn update_from_sim_object_data(&self, data: &SimObjectData) -> Result<()> {
        let view = data.view(&self.key, self.record_size())?;
        let value: T = bytemuck::try_pod_read_unaligned(view.as_bytes()).map_err(|err| {
            ContractError::invalid_layout(&*self.key, format!("payload not readable: {err}"))
        })?;
        self.pending.set(false);
        if self.has_pending_write() {
            debug!(name = %self.key, request_id = %self.request_id, "local write pending, response ignored");
            return Ok(());
        }
        self.data.set(value);
        self.received.set(self.received.get() + 1);
        debug!(name = %self.key, request_id = %self.request_id, "record updated from host");
        Ok(())
    }
}
