//! Synchronization policy and the cache state shared by all handle kinds.

use std::cell::Cell;

/// How the data manager keeps a handle in sync with the host.
///
/// A zero `max_age_time` / `max_age_ticks` disables that criterion. When
/// both are zero an auto-read handle is read every frame; otherwise a cached
/// value is reused while it is younger than either limit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VariablePolicy {
    /// Refresh every frame before the modules run
    pub auto_read: bool,
    /// Flush every frame after the modules ran, if dirty
    pub auto_write: bool,
    /// Maximum age in simulation seconds
    pub max_age_time: f64,
    /// Maximum age in frame ticks
    pub max_age_ticks: u64,
}

impl VariablePolicy {
    /// Neither read nor written automatically
    pub fn manual() -> Self {
        Self::default()
    }

    /// Read automatically, written manually
    pub fn auto_read() -> Self {
        Self {
            auto_read: true,
            ..Self::default()
        }
    }

    /// Written automatically, read manually
    pub fn auto_write() -> Self {
        Self {
            auto_write: true,
            ..Self::default()
        }
    }

    /// Read and written automatically
    pub fn auto_read_write() -> Self {
        Self {
            auto_read: true,
            auto_write: true,
            ..Self::default()
        }
    }

    pub fn with_max_age_time(mut self, seconds: f64) -> Self {
        self.max_age_time = seconds;
        self
    }

    pub fn with_max_age_ticks(mut self, ticks: u64) -> Self {
        self.max_age_ticks = ticks;
        self
    }
}

/// When a handle was last synchronized with the host
#[derive(Debug, Default)]
pub(crate) struct SyncStamp {
    time: Cell<f64>,
    tick: Cell<u64>,
    valid: Cell<bool>,
}

impl SyncStamp {
    /// Whether the last synchronization is young enough to skip a host call
    pub(crate) fn is_fresh(&self, policy: &VariablePolicy, time: f64, tick: u64) -> bool {
        if !self.valid.get() {
            return false;
        }
        // Negative age (sim time went backwards on reload) counts as stale
        let by_time = policy.max_age_time > 0.0
            && (0.0..=policy.max_age_time).contains(&(time - self.time.get()));
        let by_ticks = policy.max_age_ticks > 0
            && tick.saturating_sub(self.tick.get()) <= policy.max_age_ticks;
        by_time || by_ticks
    }

    pub(crate) fn mark(&self, time: f64, tick: u64) {
        self.time.set(time);
        self.tick.set(tick);
        self.valid.set(true);
    }

    pub(crate) fn time(&self) -> f64 {
        self.time.get()
    }

    pub(crate) fn tick(&self) -> u64 {
        self.tick.get()
    }
}

/// Cached scalar value with dirty/changed tracking
#[derive(Debug, Default)]
pub(crate) struct ScalarCache {
    value: Cell<Option<f64>>,
    dirty: Cell<bool>,
    changed: Cell<bool>,
    pub(crate) stamp: SyncStamp,
}

impl ScalarCache {
    #[inline]
    pub(crate) fn get(&self) -> f64 {
        self.value.get().unwrap_or(0.0)
    }

    #[inline]
    pub(crate) fn has_value(&self) -> bool {
        self.value.get().is_some()
    }

    /// Local write; marks the cache dirty
    pub(crate) fn set(&self, value: f64) {
        self.changed.set(self.value.get() != Some(value));
        self.value.set(Some(value));
        self.dirty.set(true);
    }

    /// Store a value just read from the host
    pub(crate) fn store_from_sim(&self, value: f64, time: f64, tick: u64) {
        self.changed.set(self.value.get() != Some(value));
        self.value.set(Some(value));
        self.stamp.mark(time, tick);
    }

    /// The host now holds the cached value
    pub(crate) fn mark_written(&self, time: f64, tick: u64) {
        self.dirty.set(false);
        self.stamp.mark(time, tick);
    }

    #[inline]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    #[inline]
    pub(crate) fn has_changed(&self) -> bool {
        self.changed.get()
    }
}
