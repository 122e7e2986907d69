//! Run statistics and metrics.

use std::time::Duration;

use observability::{FrameMetricsAggregator, MetricsSummary};
use serde::Serialize;

/// Statistics from a frame loop run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Frames run to completion
    pub frames: u64,

    /// Wall time of the run
    pub duration: Duration,

    /// Modules that were active
    pub modules: Vec<String>,

    /// Per-frame data manager metrics
    pub metrics: FrameMetricsAggregator,
}

/// JSON form of [`RunStats`]
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    frames: u64,
    duration_secs: f64,
    fps: f64,
    modules: &'a [String],
    metrics: MetricsSummary,
}

impl RunStats {
    /// Frames per second actually achieved
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&RunReport {
            frames: self.frames,
            duration_secs: self.duration.as_secs_f64(),
            fps: self.fps(),
            modules: &self.modules,
            metrics: self.metrics.summary(),
        })
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames: {}", self.frames);
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   └─ Modules: {}", self.modules.join(", "));

        let summary = self.metrics.summary();

        println!("\n📈 Data Manager Metrics");
        println!(
            "   ├─ Host reads: {} ({:.2}/frame)",
            summary.total_reads, summary.reads_per_frame
        );
        println!("   ├─ Host writes: {}", summary.total_writes);
        println!("   ├─ Record requests: {}", summary.total_requests);
        println!("   ├─ Responses routed: {}", summary.total_routed);
        println!("   ├─ Host calls per frame: {}", summary.host_calls_per_frame);
        println!("   └─ Messages per frame: {}", summary.messages_per_frame);

        if summary.total_unmatched + summary.total_size_mismatches + summary.total_failures > 0
            || summary.total_exceptions > 0
        {
            println!("\n⚠️  Problems");
            println!("   ├─ Unmatched responses: {}", summary.total_unmatched);
            println!("   ├─ Size mismatches: {}", summary.total_size_mismatches);
            println!("   ├─ Host failures: {}", summary.total_failures);
            println!("   └─ Host exceptions: {}", summary.total_exceptions);
        }

        println!();
    }
}
