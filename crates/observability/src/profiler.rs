//! 代码段耗时分析
//!
//! 每累计 `window` 个样本输出一次 debug 报告，然后重新开始统计。

use std::time::{Duration, Instant};

use crate::metrics::{RunningStats, StatsSummary};

/// Lightweight section profiler
#[derive(Debug, Clone)]
pub struct SimpleProfiler {
    name: String,
    window: usize,
    started: Option<Instant>,
    samples: RunningStats,
    reports: u64,
}

impl SimpleProfiler {
    /// `window` samples per report; 0 is treated as 1
    pub fn new(name: impl Into<String>, window: usize) -> Self {
        Self {
            name: name.into(),
            window: window.max(1),
            started: None,
            samples: RunningStats::default(),
            reports: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start timing a section
    #[inline]
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop timing; returns the window summary when a report was emitted
    ///
    /// A `stop` without a matching `start` is ignored.
    pub fn stop(&mut self) -> Option<StatsSummary> {
        let started = self.started.take()?;
        self.record(started.elapsed())
    }

    /// Add an externally measured sample
    pub fn record(&mut self, elapsed: Duration) -> Option<StatsSummary> {
        self.samples.push(elapsed.as_secs_f64() * 1e6);
        if (self.samples.count() as usize) < self.window {
            return None;
        }

        let summary = StatsSummary::from(&self.samples);
        self.reports += 1;
        tracing::debug!(
            profiler = %self.name,
            samples = summary.count,
            mean_us = summary.mean,
            min_us = summary.min,
            max_us = summary.max,
            "profiler report"
        );
        self.samples = RunningStats::default();
        Some(summary)
    }

    /// Reports emitted so far
    pub fn reports(&self) -> u64 {
        self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_every_window() {
        let mut profiler = SimpleProfiler::new("bridge", 3);

        assert!(profiler.record(Duration::from_micros(10)).is_none());
        assert!(profiler.record(Duration::from_micros(20)).is_none());
        let summary = profiler.record(Duration::from_micros(30)).unwrap();

        assert_eq!(summary.count, 3);
        assert!((summary.mean - 20.0).abs() < 1e-6);
        assert!((summary.min - 10.0).abs() < 1e-6);
        assert!((summary.max - 30.0).abs() < 1e-6);
        assert_eq!(profiler.reports(), 1);

        assert!(profiler.record(Duration::from_micros(5)).is_none());
    }

    #[test]
    fn test_stop_without_start_is_ignored() {
        let mut profiler = SimpleProfiler::new("idle", 1);
        assert!(profiler.stop().is_none());

        profiler.start();
        assert!(profiler.stop().is_some());
    }
}
