//! Named (local) variable handle

use std::rc::Rc;

use contracts::{Unit, VariableKey};
use host_client::HostTransport;
use tracing::trace;

use crate::cache::{ScalarCache, VariablePolicy};
use crate::error::Result;
use crate::variable::ManagedVariable;

/// Shared handle to a named variable
pub type NamedVariablePtr = Rc<NamedVariable>;

/// A scalar variable addressed by name on the host
///
/// Handles are created through
/// [`DataManager::make_named_variable`](crate::DataManager::make_named_variable)
/// and shared between the manager and the modules.
#[derive(Debug)]
pub struct NamedVariable {
    key: VariableKey,
    unit: Unit,
    policy: VariablePolicy,
    cache: ScalarCache,
}

impl NamedVariable {
    pub(crate) fn new(name: &str, unit: Unit, policy: VariablePolicy) -> Self {
        Self {
            key: VariableKey::named(name),
            unit,
            policy,
            cache: ScalarCache::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[inline]
    pub fn policy(&self) -> &VariablePolicy {
        &self.policy
    }

    /// Cached value; 0.0 until the first read or set
    #[inline]
    pub fn get(&self) -> f64 {
        self.cache.get()
    }

    /// Set the cached value and mark it dirty
    ///
    /// The host sees the value after the next flush (auto-write) or an
    /// explicit write.
    pub fn set(&self, value: f64) {
        self.cache.set(value);
    }

    /// Convenience for boolean variables
    pub fn set_bool(&self, value: bool) {
        self.set(if value { 1.0 } else { 0.0 });
    }

    #[inline]
    pub fn as_bool(&self) -> bool {
        self.get() != 0.0
    }

    /// Whether a value has been read or set at least once
    #[inline]
    pub fn has_value(&self) -> bool {
        self.cache.has_value()
    }

    /// Whether the last read or set changed the cached value
    #[inline]
    pub fn has_changed(&self) -> bool {
        self.cache.has_changed()
    }

    /// Simulation time of the last successful host read or write
    pub fn time_stamp(&self) -> f64 {
        self.cache.stamp.time()
    }

    /// Frame tick of the last successful host read or write
    pub fn tick_stamp(&self) -> u64 {
        self.cache.stamp.tick()
    }
}

impl ManagedVariable for NamedVariable {
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
        let value = host.read_named_variable(&self.key, self.unit)?;
        trace!(name = %self.key, value, "named variable read");
        self.cache.store_from_sim(value, time, tick);
        Ok(())
    }

    fn write_to_sim(&self, host: &mut dyn HostTransport, time: f64, tick: u64) -> Result<()> {
        let value = self.cache.get();
        host.write_named_variable(&self.key, self.unit, value)?;
        trace!(name = %self.key, value, "named variable written");
        self.cache.mark_written(time, tick);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_client::MockHostTransport;

    fn host() -> MockHostTransport {
        let mut host = MockHostTransport::new();
        host.open("test").unwrap();
        host
    }

    #[test]
    fn test_read_updates_cache() {
        let mut host = host();
        host.set_named("A32NX_IS_READY", 1.0);
        let var = NamedVariable::new("A32NX_IS_READY", Unit::Number, VariablePolicy::auto_read());

        assert!(var.refresh(&mut host, 0.0, 1).unwrap());
        assert_eq!(var.get(), 1.0);
        assert!(var.has_changed());
        assert_eq!(var.tick_stamp(), 1);
    }

    #[test]
    fn test_flush_only_when_dirty() {
        let mut host = host();
        let var = NamedVariable::new("A32NX_X", Unit::Number, VariablePolicy::auto_write());

        assert!(!var.flush(&mut host, 0.0, 1).unwrap());
        var.set(2.5);
        assert!(var.flush(&mut host, 0.0, 1).unwrap());
        assert_eq!(host.named("A32NX_X"), Some(2.5));
        assert!(!var.is_dirty());
        assert!(!var.flush(&mut host, 0.0, 2).unwrap());
        assert_eq!(host.calls().named_writes, 1);
    }

    #[test]
    fn test_manual_policy_never_syncs() {
        let mut host = host();
        let var = NamedVariable::new("A32NX_X", Unit::Number, VariablePolicy::manual());
        var.set(1.0);

        assert!(!var.refresh(&mut host, 0.0, 1).unwrap());
        assert!(!var.flush(&mut host, 0.0, 1).unwrap());
        assert_eq!(host.calls().reads, 0);
        assert_eq!(host.calls().named_writes, 0);
    }

    #[test]
    fn test_failed_read_keeps_value() {
        let mut host = host();
        host.set_named("A32NX_X", 4.0);
        let var = NamedVariable::new("A32NX_X", Unit::Number, VariablePolicy::auto_read());
        var.refresh(&mut host, 0.0, 1).unwrap();

        host.fail_reads_of("A32NX_X");
        assert!(var.refresh(&mut host, 0.1, 2).is_err());
        assert_eq!(var.get(), 4.0);
    }

    #[test]
    fn test_refresh_keeps_unwritten_value() {
        let mut host = host();
        host.set_named("A32NX_X", 1.0);
        let var = NamedVariable::new("A32NX_X", Unit::Number, VariablePolicy::auto_read_write());
        var.set(3.0);
        assert!(!var.refresh(&mut host, 0.0, 1).unwrap());
        assert!(var.is_dirty());
        assert_eq!(var.get(), 3.0);
        assert_eq!(host.calls().reads, 0);
    }
}
