//! Frame loop runner - wires the data manager, modules and host together.
//!
//! Runs against the in-memory host with scripted values; record requests
//! are answered on the same frame.

use std::future::Future;
use std::time::{Duration, Instant};

use contracts::{DataManagerConfig, FrameContext};
use data_manager::DataManager;
use host_client::{MockHostConfig, MockHostTransport};
use modules::{Arinc429LvarBridge, FrameDriver, Pushback, PushbackProfile};
use tracing::{debug, info, warn};

use super::{RunStats, Scenario};
use crate::error::Result;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Frames to run (None = until shutdown)
    pub frames: Option<u64>,

    /// Wall time between frames, also used as simulation delta
    pub frame_interval: Duration,

    /// Data manager configuration
    pub manager: DataManagerConfig,

    /// Run the pushback module
    pub pushback: bool,

    /// Run the ARINC 429 bridge module
    pub bridge: bool,
}

/// Frame loop runner
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run until the frame budget is used up or `shutdown` resolves
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let start_time = Instant::now();
        let config = self.config;

        let host = MockHostTransport::with_config(MockHostConfig {
            auto_respond: true,
            ..Default::default()
        });
        let scenario = Scenario::new(host.clone());
        scenario.prepare();

        let mut driver = FrameDriver::new(DataManager::new(config.manager.clone()));
        if config.bridge {
            driver.add_module(Box::new(Arinc429LvarBridge::new(Scenario::bridge_pairs())));
        }
        if config.pushback {
            driver.add_module(Box::new(Pushback::new(PushbackProfile::a32nx())));
        }
        driver.initialize(Box::new(host.clone()))?;

        let mut stats = RunStats {
            modules: driver
                .module_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            ..Default::default()
        };
        info!(
            modules = ?stats.modules,
            variables = driver.manager().variable_count(),
            records = driver.manager().data_definition_count(),
            "Frame loop starting"
        );

        let mut interval = tokio::time::interval(config.frame_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut frame = FrameContext::new(0.0, config.frame_interval.as_secs_f64());
        tokio::pin!(shutdown);

        loop {
            if config.frames.is_some_and(|max| stats.frames >= max) {
                info!(frames = stats.frames, "Frame budget reached");
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping frame loop...");
                    break;
                }
                _ = interval.tick() => {}
            }

            scenario.apply(&frame);
            let frame_stats = driver.run_frame(&frame)?;
            stats.metrics.update(&frame_stats);
            stats.frames += 1;

            if stats.frames % 600 == 0 {
                debug!(
                    frames = stats.frames,
                    host_calls = host.calls().reads + host.calls().total_writes(),
                    "Frame loop progress"
                );
            }
            frame = frame.next();
        }

        driver.shutdown()?;
        stats.duration = start_time.elapsed();
        Ok(stats)
    }
}
