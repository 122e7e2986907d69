//! Scripted host values for offline runs.

use contracts::FrameContext;
use host_client::MockHostTransport;
use modules::{Arinc429Word, BridgePair, SignStatus};

/// Word variables bridged during a run; targets get a `_RAW` suffix
const ARINC_SOURCES: [&str; 3] = [
    "A32NX_ADIRS_IR_1_PITCH",
    "A32NX_ADIRS_IR_1_ROLL",
    "A32NX_ADIRS_ADR_1_COMPUTED_AIRSPEED",
];

/// Drives the in-memory host like a slow pushback on a parked aircraft
pub struct Scenario {
    host: MockHostTransport,
}

impl Scenario {
    pub fn new(host: MockHostTransport) -> Self {
        Self { host }
    }

    pub fn bridge_pairs() -> Vec<BridgePair> {
        ARINC_SOURCES
            .iter()
            .map(|source| BridgePair::with_suffix(source, "_RAW"))
            .collect()
    }

    /// Host state before the first frame
    pub fn prepare(&self) {
        self.host.set_named("A32NX_IS_READY", 1.0);
        self.host.set_named("A32NX_ARINC429_LVAR_BRIDGE_ON", 1.0);
        self.host.set_named("A32NX_PUSHBACK_SYSTEM_ENABLED", 1.0);
        self.host.set_aircraft("SIM ON GROUND", 0, 1.0);
        self.host.set_aircraft("PUSHBACK ATTACHED", 0, 1.0);
        self.host.set_aircraft("PLANE HEADING DEGREES TRUE", 0, 90.0);
        self.host.set_aircraft("RELATIVE WIND VELOCITY BODY Z", 0, 0.0);
    }

    /// Host state for the frame at `frame.sim_time`
    pub fn apply(&self, frame: &FrameContext) {
        let t = frame.sim_time;

        // Tug backs up, then turns
        self.host
            .set_named("A32NX_PUSHBACK_SPD_FACTOR", -(t / 10.0).min(1.0));
        self.host
            .set_named("A32NX_PUSHBACK_HDG_FACTOR", (t / 20.0).sin() * 0.5);
        self.host
            .set_aircraft("RELATIVE WIND VELOCITY BODY Z", 0, (t * 0.3).cos() * 10.0);

        let ssm = if (t as u64) % 15 == 14 {
            SignStatus::NoComputedData
        } else {
            SignStatus::NormalOperation
        };
        let values = [(t * 0.5).sin() * 2.5, (t * 0.2).sin(), 3.0 + t];
        for (source, value) in ARINC_SOURCES.iter().zip(values) {
            let word = Arinc429Word::new(value as f32, ssm);
            self.host.set_named(source, word.to_f64());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sets_valid_words() {
        let host = MockHostTransport::new();
        let scenario = Scenario::new(host.clone());
        scenario.prepare();
        scenario.apply(&FrameContext::new(1.0, 0.1));

        let word = Arinc429Word::from_f64(host.named("A32NX_ADIRS_ADR_1_COMPUTED_AIRSPEED").unwrap());
        assert!(word.is_normal_operation());
        assert_eq!(word.value(), 4.0);
        assert_eq!(Scenario::bridge_pairs().len(), 3);
    }
}
