//! Aircraft (simulation) variable handle

use std::rc::Rc;

use contracts::{Unit, VariableKey};
use host_client::HostTransport;
use tracing::trace;

use crate::cache::{ScalarCache, VariablePolicy};
use crate::error::{DataManagerError, Result};
use crate::variable::ManagedVariable;

/// Shared handle to an aircraft variable
pub type AircraftVariablePtr = Rc<AircraftVariable>;

/// A scalar host variable addressed by name and index
///
/// Aircraft variables are read-only on the host. A handle created with a
/// setter event writes by firing that event with the cached value; without
/// one it never auto-writes.
#[derive(Debug)]
pub struct AircraftVariable {
    key: VariableKey,
    name: String,
    index: u32,
    setter_event: Option<String>,
    unit: Unit,
    policy: VariablePolicy,
    cache: ScalarCache,
}

impl AircraftVariable {
    pub(crate) fn new(
        name: &str,
        index: u32,
        setter_event: Option<&str>,
        unit: Unit,
        mut policy: VariablePolicy,
    ) -> Self {
        if setter_event.is_none() {
            policy.auto_write = false;
        }
        Self {
            key: VariableKey::indexed(name, index),
            name: name.to_string(),
            index,
            setter_event: setter_event.map(str::to_string),
            unit,
            policy,
            cache: ScalarCache::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn setter_event(&self) -> Option<&str> {
        self.setter_event.as_deref()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter_event.is_some()
    }

    #[inline]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[inline]
    pub fn policy(&self) -> &VariablePolicy {
        &self.policy
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.cache.get()
    }

    /// Set the cached value and mark it dirty
    ///
    /// Ignored for handles without a setter event, which would never be
    /// flushed.
    pub fn set(&self, value: f64) {
        if self.is_writable() {
            self.cache.set(value);
        } else {
            tracing::warn!(name = %self.key, "set on read-only aircraft variable ignored");
        }
    }

    #[inline]
    pub fn as_bool(&self) -> bool {
        self.get() != 0.0
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.cache.has_value()
    }

    #[inline]
    pub fn has_changed(&self) -> bool {
        self.cache.has_changed()
    }

    pub fn time_stamp(&self) -> f64 {
        self.cache.stamp.time()
    }

    pub fn tick_stamp(&self) -> u64 {
        self.cache.stamp.tick()
    }
}

impl ManagedVariable for AircraftVariable {
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
        self.cache.is_dirty()
    }

    fn is_fresh(&self, time: f64, tick: u64) -> bool {
        self.cache.stamp.is_fresh(&self.policy, time, tick)
    }

    fn read_from_sim(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<()> {
        let value = host.read_aircraft_variable(&self.name, self.index, self.unit)?;
        trace!(name = %self.key, value, "aircraft variable read");
        self.cache.store_from_sim(value, time, tick);
        Ok(())
    }

    fn write_to_sim(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<()> {
        let Some(event) = self.setter_event.as_deref() else {
            return Err(DataManagerError::read_only(&*self.key));
        };
        let value = self.cache.get();
        host.transmit_setter_event(event, self.index, value)?;
        trace!(name = %self.key, event, value, "setter event sent");
        self.cache.mark_written(time, tick);
        Ok(())
    }
}
