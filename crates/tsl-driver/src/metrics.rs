//! 传感器性能指标模块
//!
//! 原子计数器，驱动在每个阶段结束时批量累加。
//! 可以通过 `Arc<SensorMetrics>` 在其他线程读取，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 传感器实时指标
///
/// # 使用示例
///
/// ```rust
/// use tsl_driver::SensorMetrics;
/// use std::sync::Arc;
/// use std::sync::atomic::Ordering;
///
/// let metrics = Arc::new(SensorMetrics::default());
/// metrics.frames_captured.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.frames_captured, 1);
/// ```
#[derive(Debug, Default)]
pub struct SensorMetrics {
    /// CLK 脉冲总数（含初始化）
    pub clock_pulses_total: AtomicU64,

    /// SI 脉冲总数（含初始化）
    pub si_pulses_total: AtomicU64,

    /// 同步采样总数
    pub samples_total: AtomicU64,

    /// 完成的帧数
    pub frames_captured: AtomicU64,

    /// 寄存器清空次数
    pub flushes_total: AtomicU64,

    /// 因缓冲区长度不符被拒绝的 `read` 次数
    pub invalid_buffers: AtomicU64,
}

impl SensorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    ///
    /// 使用 `Ordering::Relaxed`，不同计数器之间可能有微小的时间差。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            clock_pulses_total: self.clock_pulses_total.load(Ordering::Relaxed),
            si_pulses_total: self.si_pulses_total.load(Ordering::Relaxed),
            samples_total: self.samples_total.load(Ordering::Relaxed),
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            flushes_total: self.flushes_total.load(Ordering::Relaxed),
            invalid_buffers: self.invalid_buffers.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.clock_pulses_total.store(0, Ordering::Relaxed);
        self.si_pulses_total.store(0, Ordering::Relaxed);
        self.samples_total.store(0, Ordering::Relaxed);
        self.frames_captured.store(0, Ordering::Relaxed);
        self.flushes_total.store(0, Ordering::Relaxed);
        self.invalid_buffers.store(0, Ordering::Relaxed);
    }

    pub(crate) fn add_pulses(&self, clock: u64, si: u64) {
        self.clock_pulses_total.fetch_add(clock, Ordering::Relaxed);
        self.si_pulses_total.fetch_add(si, Ordering::Relaxed);
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub clock_pulses_total: u64,
    pub si_pulses_total: u64,
    pub samples_total: u64,
    pub frames_captured: u64,
    pub flushes_total: u64,
    pub invalid_buffers: u64,
}

impl MetricsSnapshot {
    /// 平均每帧采样数
    ///
    /// 正常情况下恒为 640。如果 `frames_captured` 为 0，返回 0.0。
    pub fn samples_per_frame(&self) -> f64 {
        if self.frames_captured == 0 {
            return 0.0;
        }
        self.samples_total as f64 / self.frames_captured as f64
    }

    /// 被拒绝的 `read` 调用比例（百分比）
    pub fn invalid_buffer_rate(&self) -> f64 {
        let attempts = self.frames_captured + self.invalid_buffers;
        if attempts == 0 {
            return 0.0;
        }
        (self.invalid_buffers as f64 / attempts as f64) * 100.0
    }
}
