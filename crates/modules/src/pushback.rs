//! Pushback control
//!
//! Moves the aircraft while a tug is attached by writing body velocities to
//! the host as one record. Aircraft specific tuning comes from an injected
//! [`PushbackProfile`].

use bytemuck::{Pod, Zeroable};
use contracts::{FieldDescriptor, FrameContext, Unit};
use data_manager::{
    AircraftVariablePtr, DataDefinitionVariablePtr, DataManager, NamedVariablePtr, VariablePolicy,
};
use observability::SimpleProfiler;
use tracing::{debug, info};

use crate::error::{ModuleError, Result};
use crate::module::Module;

/// Aircraft specific pushback tuning
#[derive(Debug, Clone, Copy)]
pub struct PushbackProfile {
    /// Speed is divided by this factor while the parking brake is set
    pub park_brake_factor: f64,
    /// ft/s of `VELOCITY BODY Z` at full speed command
    pub speed_factor: f64,
    /// rad/s of `ROTATION VELOCITY BODY Y` at full heading command
    pub turn_speed_factor: f64,
    /// Counter rotation acceleration from inertia speed and body Z wind
    ///
    /// Keeps the nose down when elevator lift builds up during pushback,
    /// especially in strong wind.
    pub counter_rotation: fn(inertia_speed: f64, wind_vel_body_z: f64) -> f64,
}

impl PushbackProfile {
    pub fn a32nx() -> Self {
        Self {
            park_brake_factor: 10.0,
            speed_factor: 18.0,
            turn_speed_factor: 0.5,
            counter_rotation: a32nx_counter_rotation,
        }
    }
}

impl Default for PushbackProfile {
    fn default() -> Self {
        Self::a32nx()
    }
}

fn a32nx_counter_rotation(inertia_speed: f64, wind_vel_body_z: f64) -> f64 {
    if inertia_speed > 0.0 {
        wind_vel_body_z / 2000.0 - 0.5
    } else if inertia_speed < 0.0 {
        wind_vel_body_z / 2000.0 + 1.0
    } else {
        0.0
    }
}

/// Moves a value towards a target in fixed steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertialDampener {
    value: f64,
    accel_factor: f64,
    accel_threshold: f64,
}

impl InertialDampener {
    pub fn new(start_value: f64, accel_factor: f64, accel_threshold: f64) -> Self {
        Self {
            value: start_value,
            accel_factor,
            accel_threshold,
        }
    }

    /// Step towards `target`; snaps to it once within the threshold
    pub fn update_speed(&mut self, target: f64) -> f64 {
        if (target - self.value).abs() > self.accel_threshold {
            if target > self.value {
                self.value += self.accel_factor;
            } else {
                self.value -= self.accel_factor;
            }
        } else {
            self.value = target;
        }
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Record written to the host every active frame
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PushbackData {
    pub pushback_wait: f64,
    pub vel_body_z: f64,
    pub rot_vel_body_y: f64,
    pub rot_accel_body_x: f64,
}

impl PushbackData {
    fn fields() -> Vec<FieldDescriptor> {
        FieldDescriptor::f64_fields([
            ("Pushback Wait", Unit::Bool),
            ("VELOCITY BODY Z", Unit::FeetPerSecond),
            ("ROTATION VELOCITY BODY Y", Unit::FeetPerSecond),
            ("ROTATION ACCELERATION BODY X", Unit::RadiansPerSecondSquared),
        ])
    }
}

struct PushbackHandles {
    system_enabled: NamedVariablePtr,
    parking_brake: NamedVariablePtr,
    heading_factor: NamedVariablePtr,
    speed_factor: NamedVariablePtr,
    tug_commanded_heading: NamedVariablePtr,
    tug_commanded_speed: NamedVariablePtr,
    tug_inertia_speed: NamedVariablePtr,
    update_delta: NamedVariablePtr,
    rot_x_out: NamedVariablePtr,
    sim_on_ground: AircraftVariablePtr,
    pushback_attached: AircraftVariablePtr,
    aircraft_heading: AircraftVariablePtr,
    wind_vel_body_z: AircraftVariablePtr,
    data: DataDefinitionVariablePtr<PushbackData>,
}

/// Pushback module
///
/// Active while `A32NX_PUSHBACK_SYSTEM_ENABLED` is set, a tug is attached
/// and the aircraft is on ground.
pub struct Pushback {
    profile: PushbackProfile,
    dampener: InertialDampener,
    handles: Option<PushbackHandles>,
    profiler: SimpleProfiler,
}

impl Pushback {
    pub fn new(profile: PushbackProfile) -> Self {
        Self {
            profile,
            dampener: InertialDampener::new(0.0, 0.15, 0.1),
            handles: None,
            profiler: SimpleProfiler::new("Pushback::update", 120),
        }
    }

    pub fn profile(&self) -> &PushbackProfile {
        &self.profile
    }

    /// Current dampened tug speed
    pub fn inertia_speed(&self) -> f64 {
        self.dampener.value()
    }
}

impl Module for Pushback {
    fn name(&self) -> &str {
        "pushback"
    }

    fn initialize(&mut self, manager: &mut DataManager) -> Result<()> {
        let read = VariablePolicy::auto_read();
        let write = VariablePolicy::auto_write();

        let data = manager.make_data_definition_variable(
            "PushbackData",
            PushbackData::fields(),
            PushbackData::default(),
            VariablePolicy::manual(),
        )?;

        self.handles = Some(PushbackHandles {
            system_enabled: manager.make_named_variable(
                "A32NX_PUSHBACK_SYSTEM_ENABLED",
                Unit::Bool,
                read,
            ),
            parking_brake: manager.make_named_variable(
                "A32NX_PARK_BRAKE_LEVER_POS",
                Unit::Bool,
                read,
            ),
            heading_factor: manager.make_named_variable(
                "A32NX_PUSHBACK_HDG_FACTOR",
                Unit::Number,
                read,
            ),
            speed_factor: manager.make_named_variable(
                "A32NX_PUSHBACK_SPD_FACTOR",
                Unit::Number,
                read,
            ),
            tug_commanded_heading: manager.make_named_variable(
                "A32NX_PUSHBACK_HDG",
                Unit::Degrees,
                write,
            ),
            tug_commanded_speed: manager.make_named_variable(
                "A32NX_PUSHBACK_SPD",
                Unit::FeetPerSecond,
                write,
            ),
            tug_inertia_speed: manager.make_named_variable(
                "A32NX_PUSHBACK_INERTIA_SPD",
                Unit::FeetPerSecond,
                write,
            ),
            update_delta: manager.make_named_variable(
                "A32NX_PUSHBACK_UPDT_DELTA",
                Unit::Seconds,
                write,
            ),
            rot_x_out: manager.make_named_variable(
                "A32NX_PUSHBACK_R_X_OUT",
                Unit::RadiansPerSecondSquared,
                write,
            ),
            sim_on_ground: manager.make_aircraft_variable(
                "SIM ON GROUND",
                0,
                None,
                Unit::Bool,
                read,
            ),
            pushback_attached: manager.make_aircraft_variable(
                "PUSHBACK ATTACHED",
                0,
                None,
                Unit::Bool,
                read,
            ),
            aircraft_heading: manager.make_aircraft_variable(
                "PLANE HEADING DEGREES TRUE",
                0,
                None,
                Unit::Degrees,
                read,
            ),
            wind_vel_body_z: manager.make_aircraft_variable(
                "RELATIVE WIND VELOCITY BODY Z",
                0,
                None,
                Unit::FeetPerSecond,
                read,
            ),
            data,
        });

        info!(profile = ?self.profile, "pushback initialized");
        Ok(())
    }

    fn update(&mut self, manager: &mut DataManager, frame: &FrameContext) -> Result<()> {
        let Some(h) = &self.handles else {
            return Err(ModuleError::failed("pushback", "update", "not initialized"));
        };

        if !h.system_enabled.as_bool()
            || !h.pushback_attached.as_bool()
            || !h.sim_on_ground.as_bool()
        {
            return Ok(());
        }

        self.profiler.start();

        let profile = &self.profile;
        let park_brake_spd_factor = if h.parking_brake.as_bool() {
            1.0 / profile.park_brake_factor
        } else {
            1.0
        };

        let tug_cmd_spd = h.speed_factor.get() * park_brake_spd_factor * profile.speed_factor;
        let inertia_speed = self.dampener.update_speed(tug_cmd_spd);

        let rotation_velocity = sign(tug_cmd_spd)
            * h.heading_factor.get()
            * park_brake_spd_factor
            * profile.turn_speed_factor;
        let computed_heading =
            (h.aircraft_heading.get() - 90.0 * h.heading_factor.get()).rem_euclid(360.0);
        let counter_rot_accel = (profile.counter_rotation)(inertia_speed, h.wind_vel_body_z.get());

        h.tug_commanded_heading.set(computed_heading);
        h.tug_commanded_speed.set(tug_cmd_spd);
        h.tug_inertia_speed.set(inertia_speed);
        h.update_delta.set(frame.delta_time);
        h.rot_x_out.set(counter_rot_accel);

        h.data.set_data(PushbackData {
            pushback_wait: if inertia_speed == 0.0 { 1.0 } else { 0.0 },
            vel_body_z: inertia_speed,
            rot_vel_body_y: rotation_velocity,
            rot_accel_body_x: counter_rot_accel,
        });
        manager.write_now(&*h.data)?;

        if let Some(report) = self.profiler.stop() {
            debug!(mean_us = report.mean, max_us = report.max, "pushback timing");
        }
        Ok(())
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DefinitionId;
    use data_manager::DataManagerConfig;
    use host_client::MockHostTransport;

    #[test]
    fn test_dampener_steps_then_snaps() {
        let mut dampener = InertialDampener::new(0.0, 0.15, 0.1);
        assert!((dampener.update_speed(1.0) - 0.15).abs() < 1e-12);
        assert!((dampener.update_speed(1.0) - 0.30).abs() < 1e-12);
        assert!((dampener.update_speed(0.35) - 0.35).abs() < 1e-12);
        assert!((dampener.update_speed(0.0) - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_a32nx_counter_rotation() {
        let rot = PushbackProfile::a32nx().counter_rotation;
        assert_eq!(rot(1.0, 1000.0), 0.0);
        assert_eq!(rot(-1.0, 0.0), 1.0);
        assert_eq!(rot(0.0, 500.0), 0.0);
    }

    #[test]
    fn test_record_layout_matches_struct() {
        let fields = PushbackData::fields();
        assert!(contracts::validate_layout(
            "PushbackData",
            &fields,
            std::mem::size_of::<PushbackData>()
        )
        .is_ok());
    }

    fn setup(host: &MockHostTransport) -> (DataManager, Pushback) {
        let mut manager = DataManager::new(DataManagerConfig::default());
        manager.initialize(Box::new(host.clone())).unwrap();
        let mut pushback = Pushback::new(PushbackProfile::a32nx());
        pushback.initialize(&mut manager).unwrap();
        (manager, pushback)
    }

    fn set_scene(host: &MockHostTransport, attached: bool) {
        host.set_aircraft("SIM ON GROUND", 0, 1.0);
        host.set_aircraft("PUSHBACK ATTACHED", 0, if attached { 1.0 } else { 0.0 });
        host.set_aircraft("PLANE HEADING DEGREES TRUE", 0, 10.0);
        host.set_aircraft("RELATIVE WIND VELOCITY BODY Z", 0, 0.0);
        host.set_named("A32NX_PUSHBACK_SYSTEM_ENABLED", 1.0);
        host.set_named("A32NX_PUSHBACK_SPD_FACTOR", 1.0);
        host.set_named("A32NX_PUSHBACK_HDG_FACTOR", 0.5);
    }

    fn frame(manager: &mut DataManager, pushback: &mut Pushback) {
        let frame = FrameContext::new(manager.tick_counter() as f64 * 0.05, 0.05);
        manager.pre_update(&frame).unwrap();
        pushback.update(manager, &frame).unwrap();
        manager.post_update(&frame).unwrap();
    }

    #[test]
    fn test_active_pushback_writes_record() {
        let host = MockHostTransport::new();
        set_scene(&host, true);
        let (mut manager, mut pushback) = setup(&host);

        frame(&mut manager, &mut pushback);

        let bytes = host.record_bytes(DefinitionId(1)).unwrap();
        let data: PushbackData = bytemuck::pod_read_unaligned(&bytes);
        assert_eq!(data.pushback_wait, 0.0);
        assert!((data.vel_body_z - 0.15).abs() < 1e-12);
        assert!((data.rot_vel_body_y - 0.25).abs() < 1e-12);
        assert!((data.rot_accel_body_x + 0.5).abs() < 1e-12);
        assert_eq!(host.named("A32NX_PUSHBACK_HDG"), Some(325.0));
        assert_eq!(host.named("A32NX_PUSHBACK_SPD"), Some(18.0));
    }

    #[test]
    fn test_parking_brake_slows_tug() {
        let host = MockHostTransport::new();
        set_scene(&host, true);
        host.set_named("A32NX_PARK_BRAKE_LEVER_POS", 1.0);
        let (mut manager, mut pushback) = setup(&host);

        frame(&mut manager, &mut pushback);

        let speed = host.named("A32NX_PUSHBACK_SPD").unwrap();
        assert!((speed - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_no_tug_no_write() {
        let host = MockHostTransport::new();
        set_scene(&host, false);
        let (mut manager, mut pushback) = setup(&host);

        frame(&mut manager, &mut pushback);

        assert!(host.record_bytes(DefinitionId(1)).is_none());
        assert_eq!(pushback.inertia_speed(), 0.0);
    }

    #[test]
    fn test_update_before_initialize_fails() {
        let mut manager = DataManager::new(DataManagerConfig::default());
        let mut pushback = Pushback::new(PushbackProfile::default());
        assert!(pushback
            .update(&mut manager, &FrameContext::default())
            .is_err());
    }
}
