//! ARINC 429 variable bridge
//!
//! Some variables hold a whole ARINC 429 word: the data as an `f32` in the
//! low 32 bits and the sign/status matrix (SSM) in bits 32..34, stored in
//! an `f64`. Consumers that only understand plain numbers read a bridged
//! copy holding the decoded value, or 0.0 when the word is not valid.

use contracts::{FrameContext, Unit};
use data_manager::{DataManager, NamedVariablePtr, VariablePolicy};
use observability::SimpleProfiler;
use tracing::{debug, info};

use crate::error::Result;
use crate::module::Module;

const IS_READY: &str = "A32NX_IS_READY";
const BRIDGE_ON: &str = "A32NX_ARINC429_LVAR_BRIDGE_ON";
const PROFILER_WINDOW: usize = 100;

/// ARINC 429 sign/status matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignStatus {
    FailureWarning = 0b00,
    NoComputedData = 0b01,
    FunctionalTest = 0b10,
    NormalOperation = 0b11,
}

impl SignStatus {
    fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0b00 => SignStatus::FailureWarning,
            0b01 => SignStatus::NoComputedData,
            0b10 => SignStatus::FunctionalTest,
            _ => SignStatus::NormalOperation,
        }
    }
}

/// An ARINC 429 word as stored in a host variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arinc429Word {
    raw: u64,
}

impl Arinc429Word {
    pub fn new(value: f32, ssm: SignStatus) -> Self {
        Self {
            raw: ((ssm as u64) << 32) | u64::from(value.to_bits()),
        }
    }

    /// Decode the host representation; negative or non-finite input reads
    /// as an all-zero word
    pub fn from_f64(word: f64) -> Self {
        let raw = if word.is_finite() && word >= 0.0 {
            word as u64
        } else {
            0
        };
        Self { raw }
    }

    /// Host representation
    pub fn to_f64(self) -> f64 {
        self.raw as f64
    }

    #[inline]
    pub fn value(self) -> f32 {
        f32::from_bits(self.raw as u32)
    }

    #[inline]
    pub fn ssm(self) -> SignStatus {
        SignStatus::from_bits(self.raw >> 32)
    }

    #[inline]
    pub fn is_normal_operation(self) -> bool {
        self.ssm() == SignStatus::NormalOperation
    }

    #[inline]
    pub fn is_functional_test(self) -> bool {
        self.ssm() == SignStatus::FunctionalTest
    }

    /// Plain value seen by bridged consumers
    pub fn bridged_value(self) -> f64 {
        if self.is_normal_operation() || self.is_functional_test() {
            f64::from(self.value())
        } else {
            0.0
        }
    }
}

/// A source word variable and the plain variable it is bridged to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgePair {
    pub source: String,
    pub target: String,
}

impl BridgePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Target named `<source><suffix>`
    pub fn with_suffix(source: &str, suffix: &str) -> Self {
        Self::new(source, format!("{source}{suffix}"))
    }
}

/// Writes the decoded value of each source word to its target variable
/// while the aircraft is ready and the bridge is switched on
pub struct Arinc429LvarBridge {
    pairs: Vec<BridgePair>,
    is_ready: Option<NamedVariablePtr>,
    bridge_on: Option<NamedVariablePtr>,
    handles: Vec<(NamedVariablePtr, NamedVariablePtr)>,
    profiler: SimpleProfiler,
    conversions: u64,
}

impl Arinc429LvarBridge {
    pub fn new(pairs: Vec<BridgePair>) -> Self {
        Self {
            pairs,
            is_ready: None,
            bridge_on: None,
            handles: Vec::new(),
            profiler: SimpleProfiler::new("Arinc429LvarBridge::update", PROFILER_WINDOW),
            conversions: 0,
        }
    }

    /// Target values written so far
    pub fn conversions(&self) -> u64 {
        self.conversions
    }

    fn is_active(&self) -> bool {
        let flag = |var: &Option<NamedVariablePtr>| var.as_ref().is_some_and(|v| v.as_bool());
        flag(&self.is_ready) && flag(&self.bridge_on)
    }
}

impl Module for Arinc429LvarBridge {
    fn name(&self) -> &str {
        "arinc429_lvar_bridge"
    }

    fn initialize(&mut self, manager: &mut DataManager) -> Result<()> {
        self.is_ready =
            Some(manager.make_named_variable(IS_READY, Unit::Number, VariablePolicy::auto_read()));
        self.bridge_on =
            Some(manager.make_named_variable(BRIDGE_ON, Unit::Number, VariablePolicy::auto_read()));

        self.handles = self
            .pairs
            .iter()
            .map(|pair| {
                let source = manager.make_named_variable(
                    &pair.source,
                    Unit::Number,
                    VariablePolicy::auto_read(),
                );
                let target = manager.make_named_variable(
                    &pair.target,
                    Unit::Number,
                    VariablePolicy::auto_write(),
                );
                (source, target)
            })
            .collect();

        info!(pairs = self.handles.len(), "arinc429 bridge initialized");
        Ok(())
    }

    fn update(&mut self, _manager: &mut DataManager, _frame: &FrameContext) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }

        self.profiler.start();
        for (source, target) in &self.handles {
            let value = Arinc429Word::from_f64(source.get()).bridged_value();
            if !target.has_value() || target.get() != value {
                target.set(value);
                self.conversions += 1;
            }
        }
        if let Some(report) = self.profiler.stop() {
            debug!(mean_us = report.mean, "arinc429 bridge timing");
        }
        Ok(())
    }
}
