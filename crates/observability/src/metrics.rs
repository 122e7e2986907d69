//! 数据管理器指标收集模块
//!
//! 基于 FrameStats 收集和统计每帧的宿主交互指标。

use contracts::FrameStats;
use metrics::{counter, gauge, histogram};
use serde::Serialize;

/// 从 FrameStats 记录指标
///
/// 每帧 post_update 结束时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_frame_stats;
///
/// manager.post_update(&frame)?;
/// record_frame_stats(&manager.last_frame_stats());
/// ```
pub fn record_frame_stats(stats: &FrameStats) {
    // 帧计数器
    counter!("sim_bridge_frames_total").increment(1);

    // 帧 tick (用于检测跳帧)
    gauge!("sim_bridge_last_tick").set(stats.tick as f64);

    // 宿主读写
    counter!("sim_bridge_host_reads_total").increment(u64::from(stats.host_reads));
    counter!("sim_bridge_host_writes_total").increment(u64::from(stats.host_writes));
    counter!("sim_bridge_record_requests_total").increment(u64::from(stats.record_requests));
    histogram!("sim_bridge_host_calls_per_frame")
        .record(f64::from(stats.host_reads + stats.host_writes + stats.record_requests));

    // 消息分发
    gauge!("sim_bridge_messages_per_frame").set(f64::from(stats.messages));
    if stats.unmatched_responses > 0 {
        counter!("sim_bridge_unmatched_responses_total")
            .increment(u64::from(stats.unmatched_responses));
    }
    if stats.size_mismatches > 0 {
        counter!("sim_bridge_size_mismatch_total").increment(u64::from(stats.size_mismatches));
    }
}

/// 记录单帧耗时 (毫秒)
pub fn record_frame_duration_ms(duration_ms: f64) {
    histogram!("sim_bridge_frame_duration_ms").record(duration_ms);
}

/// 记录模块失败
pub fn record_module_failure(module: &str, phase: &'static str) {
    counter!(
        "sim_bridge_module_failures_total",
        "module" => module.to_string(),
        "phase" => phase
    )
    .increment(1);
}

/// 帧指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FrameMetricsAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 宿主读取总数
    pub total_reads: u64,

    /// 宿主写入总数
    pub total_writes: u64,

    /// 记录请求总数
    pub total_requests: u64,

    /// 路由成功的响应总数
    pub total_routed: u64,

    /// 未匹配的响应总数
    pub total_unmatched: u64,

    /// 长度不符的响应总数
    pub total_size_mismatches: u64,

    /// 宿主调用失败总数
    pub total_failures: u64,

    /// 宿主异常通知总数
    pub total_exceptions: u64,

    /// 每帧宿主调用数统计
    pub host_call_stats: RunningStats,

    /// 每帧消息数统计
    pub message_stats: RunningStats,
}

impl FrameMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, stats: &FrameStats) {
        self.total_frames += 1;
        self.total_reads += u64::from(stats.host_reads);
        self.total_writes += u64::from(stats.host_writes);
        self.total_requests += u64::from(stats.record_requests);
        self.total_routed += u64::from(stats.routed_responses);
        self.total_unmatched += u64::from(stats.unmatched_responses);
        self.total_size_mismatches += u64::from(stats.size_mismatches);
        self.total_failures += u64::from(stats.host_failures);
        self.total_exceptions += u64::from(stats.exceptions);

        self.host_call_stats
            .push(f64::from(stats.host_reads + stats.host_writes + stats.record_requests));
        self.message_stats.push(f64::from(stats.messages));
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            total_reads: self.total_reads,
            total_writes: self.total_writes,
            total_requests: self.total_requests,
            total_routed: self.total_routed,
            total_unmatched: self.total_unmatched,
            total_size_mismatches: self.total_size_mismatches,
            total_failures: self.total_failures,
            total_exceptions: self.total_exceptions,
            reads_per_frame: if self.total_frames > 0 {
                self.total_reads as f64 / self.total_frames as f64
            } else {
                0.0
            },
            host_calls_per_frame: StatsSummary::from(&self.host_call_stats),
            messages_per_frame: StatsSummary::from(&self.message_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub total_reads: u64,
    pub total_writes: u64,
    pub total_requests: u64,
    pub total_routed: u64,
    pub total_unmatched: u64,
    pub total_size_mismatches: u64,
    pub total_failures: u64,
    pub total_exceptions: u64,
    pub reads_per_frame: f64,
    pub host_calls_per_frame: StatsSummary,
    pub messages_per_frame: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Data Manager Metrics Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Host reads: {} ({:.2}/frame)",
            self.total_reads, self.reads_per_frame
        )?;
        writeln!(f, "Host writes: {}", self.total_writes)?;
        writeln!(f, "Record requests: {}", self.total_requests)?;
        writeln!(
            f,
            "Responses: {} routed, {} unmatched, {} size mismatches",
            self.total_routed, self.total_unmatched, self.total_size_mismatches
        )?;
        writeln!(f, "Host failures: {}", self.total_failures)?;
        writeln!(f, "Host exceptions: {}", self.total_exceptions)?;
        writeln!(f, "Host calls per frame: {}", self.host_calls_per_frame)?;
        writeln!(f, "Messages per frame: {}", self.messages_per_frame)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
