//! Frame driver - runs the data manager and the modules through each frame.

use std::time::Instant;

use contracts::{FrameContext, FrameStats};
use data_manager::DataManager;
use host_client::HostTransport;
use tracing::{error, info, instrument, warn};

use crate::error::{ModuleError, Result};
use crate::module::Module;

type Phase = fn(&mut dyn Module, &mut DataManager, &FrameContext) -> Result<()>;

/// Drives one frame in a fixed order:
///
/// 1. data manager `pre_update` (auto-read, drain responses)
/// 2. module `pre_update`, `update`, `post_update` for every module
/// 3. data manager `post_update` (auto-write)
///
/// A failing module is logged and the frame continues with the next one.
pub struct FrameDriver {
    manager: DataManager,
    modules: Vec<Box<dyn Module>>,
    frames: u64,
}

impl FrameDriver {
    pub fn new(manager: DataManager) -> Self {
        Self {
            manager,
            modules: Vec::new(),
            frames: 0,
        }
    }

    /// Builder-style module registration; modules run in insertion order
    pub fn with_module(mut self, module: impl Module + 'static) -> Self {
        self.add_module(Box::new(module));
        self
    }

    pub fn add_module(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    pub fn manager(&self) -> &DataManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut DataManager {
        &mut self.manager
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Connect the data manager and initialize every module
    ///
    /// # Errors
    /// The transport could not be opened or a module failed to create its
    /// handles. Both are fatal for the run.
    #[instrument(name = "frame_driver_initialize", skip_all, fields(modules = self.modules.len()))]
    pub fn initialize(&mut self, transport: Box<dyn HostTransport>) -> Result<()> {
        self.manager
            .initialize(transport)
            .map_err(|e| ModuleError::Initialization(e.to_string()))?;

        for module in &mut self.modules {
            module.initialize(&mut self.manager).map_err(|e| {
                error!(module = module.name(), error = %e, "module initialization failed");
                ModuleError::Initialization(format!("{}: {e}", module.name()))
            })?;
            info!(module = module.name(), "module initialized");
        }
        Ok(())
    }

    /// Run one frame
    ///
    /// # Errors
    /// Only when the data manager is not initialized; module failures are
    /// logged and counted.
    #[instrument(level = "trace", name = "frame_driver_run_frame", skip_all, fields(sim_time = frame.sim_time))]
    pub fn run_frame(&mut self, frame: &FrameContext) -> Result<FrameStats> {
        let started = Instant::now();

        self.manager.pre_update(frame)?;
        self.run_phase("pre_update", frame, |m, dm, f| m.pre_update(dm, f));
        self.manager.update(frame)?;
        self.run_phase("update", frame, |m, dm, f| m.update(dm, f));
        self.run_phase("post_update", frame, |m, dm, f| m.post_update(dm, f));
        self.manager.post_update(frame)?;

        self.frames += 1;
        observability::record_frame_duration_ms(started.elapsed().as_secs_f64() * 1000.0);
        Ok(self.manager.last_frame_stats())
    }

    /// Shut every module down, then the data manager
    #[instrument(name = "frame_driver_shutdown", skip_all)]
    pub fn shutdown(&mut self) -> Result<()> {
        for module in &mut self.modules {
            if let Err(e) = module.shutdown(&mut self.manager) {
                warn!(module = module.name(), error = %e, "module shutdown failed");
            }
        }
        self.manager.shutdown()?;
        info!(frames = self.frames, "frame driver shut down");
        Ok(())
    }

    fn run_phase(&mut self, phase: &'static str, frame: &FrameContext, run: Phase) {
        for module in &mut self.modules {
            if let Err(e) = run(module.as_mut(), &mut self.manager, frame) {
                observability::record_module_failure(module.name(), phase);
                warn!(module = module.name(), phase, error = %e, "module phase failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use contracts::Unit;
    use data_manager::{DataManagerConfig, NamedVariablePtr, VariablePolicy};
    use host_client::{MockHostConfig, MockHostTransport};

    use super::*;

    /// Records the phases it sees and copies an input variable to an output
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        fail_update: bool,
        input: Option<NamedVariablePtr>,
        output: Option<NamedVariablePtr>,
    }

    impl Recorder {
        fn new(name: &'static str, log: Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name,
                log,
                fail_update: false,
                input: None,
                output: None,
            }
        }
    }

    impl Module for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&mut self, manager: &mut DataManager) -> Result<()> {
            self.input = Some(manager.make_named_variable(
                "IN",
                Unit::Number,
                VariablePolicy::auto_read(),
            ));
            self.output = Some(manager.make_named_variable(
                &format!("OUT_{}", self.name),
                Unit::Number,
                VariablePolicy::auto_write(),
            ));
            Ok(())
        }

        fn pre_update(&mut self, _: &mut DataManager, _: &FrameContext) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:pre", self.name));
            Ok(())
        }

        fn update(&mut self, _: &mut DataManager, _: &FrameContext) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:update", self.name));
            if self.fail_update {
                return Err(ModuleError::failed(self.name, "update", "boom"));
            }
            if let (Some(input), Some(output)) = (&self.input, &self.output) {
                output.set(input.get() * 2.0);
            }
            Ok(())
        }

        fn post_update(&mut self, _: &mut DataManager, _: &FrameContext) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:post", self.name));
            Ok(())
        }
    }

    fn driver(modules: Vec<Recorder>) -> (FrameDriver, MockHostTransport) {
        let host = MockHostTransport::new();
        let mut driver = FrameDriver::new(DataManager::new(DataManagerConfig::default()));
        for module in modules {
            driver.add_module(Box::new(module));
        }
        driver.initialize(Box::new(host.clone())).unwrap();
        (driver, host)
    }

    #[test]
    fn test_phase_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut driver, _host) = driver(vec![
            Recorder::new("a", log.clone()),
            Recorder::new("b", log.clone()),
        ]);

        driver.run_frame(&FrameContext::new(0.0, 0.016)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["a:pre", "b:pre", "a:update", "b:update", "a:post", "b:post"]
        );
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn test_values_flow_read_compute_write() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut driver, host) = driver(vec![Recorder::new("a", log)]);
        host.set_named("IN", 21.0);

        driver.run_frame(&FrameContext::new(0.0, 0.016)).unwrap();

        assert_eq!(host.named("OUT_a"), Some(42.0));
    }

    #[test]
    fn test_failing_module_does_not_stop_frame() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut failing = Recorder::new("a", log.clone());
        failing.fail_update = true;
        let (mut driver, host) = driver(vec![failing, Recorder::new("b", log.clone())]);
        host.set_named("IN", 1.0);

        let stats = driver.run_frame(&FrameContext::new(0.0, 0.016)).unwrap();

        assert!(log.borrow().contains(&"b:update".to_string()));
        assert_eq!(host.named("OUT_b"), Some(2.0));
        assert_eq!(host.named("OUT_a"), None);
        assert_eq!(stats.host_writes, 1);
    }

    #[test]
    fn test_initialize_fails_when_host_refuses() {
        let host = MockHostTransport::with_config(MockHostConfig {
            refuse_open: true,
            ..Default::default()
        });
        let mut driver = FrameDriver::new(DataManager::new(DataManagerConfig::default()));
        assert!(matches!(
            driver.initialize(Box::new(host)),
            Err(ModuleError::Initialization(_))
        ));
    }

    #[test]
    fn test_shutdown_closes_host() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut driver, host) = driver(vec![Recorder::new("a", log)]);
        driver.shutdown().unwrap();
        assert!(!host.is_open());
        assert!(driver
            .run_frame(&FrameContext::new(0.0, 0.016))
            .is_err());
    }
}
