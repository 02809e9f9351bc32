//! TSL1410R 传感器驱动
//!
//! 封装寄存器清空、曝光与读出时序，对外只暴露 [`Tsl1410r::read`]。

use crate::error::DriverError;
use crate::frame::*;
use crate::hooks::{CaptureCallback, HookManager};
use crate::metrics::SensorMetrics;
use crate::phase::CapturePhase;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use tsl_hal::{DelayUs, DigitalIo, PinMode, SamplePair, SensorPins, SyncSampler};

/// 单帧采集报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    /// 帧序号（从 0 开始，只统计成功的采集）
    pub capture_seq: u64,
    /// 本帧使用的额外曝光时间（微秒）
    pub exposure_us: u32,
    /// 本帧发出的 CLK 脉冲数（恒为 1722）
    pub clock_pulses: u64,
    /// 本帧发出的 SI 脉冲数（恒为 2）
    pub si_pulses: u64,
    /// 本帧同步采样次数（恒为 640）
    pub samples: u64,
    /// `read` 调用耗时
    pub elapsed: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
struct PulseCounters {
    clock: u64,
    si: u64,
    samples: u64,
}

/// TSL1410R 驱动（对外 API）
///
/// 独占四个引脚与三种硬件能力，不存在任何全局状态，多个传感器可以各自持有一个实例。
///
/// # 示例
///
/// ```rust
/// use tsl_driver::{FRAME_BYTES, Tsl1410r};
/// use tsl_hal::mock::{SimConfig, SimulatedSensor};
///
/// let sim = SimulatedSensor::new(SimConfig::default());
/// let mut sensor = Tsl1410r::new(sim.pins(), sim.io(), sim.sampler(), sim.delay());
///
/// let mut frame = [0u8; FRAME_BYTES];
/// let report = sensor.read(&mut frame).unwrap();
/// assert_eq!(report.samples, 640);
/// ```
pub struct Tsl1410r<IO, ADC, D> {
    pins: SensorPins,
    io: IO,
    sampler: ADC,
    delay: D,
    /// 额外曝光时间（微秒），每帧开始时读取一次
    exposure_us: u32,
    phase: CapturePhase,
    hooks: HookManager,
    metrics: Arc<SensorMetrics>,
    captures: u64,
    counters: PulseCounters,
}

impl<IO, ADC, D> Tsl1410r<IO, ADC, D>
where
    IO: DigitalIo,
    ADC: SyncSampler,
    D: DelayUs,
{
    /// 创建驱动并初始化传感器
    ///
    /// 配置引脚方向（CLK/SI 输出，AO1/AO2 输入），随后执行 [`flush`](Self::flush)。
    /// 引脚合法性由平台层负责；需要校验引脚互不相同时使用 [`SensorBuilder`](crate::SensorBuilder)。
    pub fn new(pins: SensorPins, io: IO, sampler: ADC, delay: D) -> Self {
        Self::with_parts(
            pins,
            io,
            sampler,
            delay,
            DEFAULT_EXPOSURE_US,
            HookManager::new(),
            Arc::new(SensorMetrics::new()),
        )
    }

    pub(crate) fn with_parts(
        pins: SensorPins,
        io: IO,
        sampler: ADC,
        delay: D,
        exposure_us: u32,
        hooks: HookManager,
        metrics: Arc<SensorMetrics>,
    ) -> Self {
        let mut sensor = Self {
            pins,
            io,
            sampler,
            delay,
            exposure_us,
            phase: CapturePhase::Idle,
            hooks,
            metrics,
            captures: 0,
            counters: PulseCounters::default(),
        };
        sensor.configure_pins();
        sensor.flush();
        sensor
    }

    fn configure_pins(&mut self) {
        let pins = self.pins;
        self.io.configure(pins.clock, PinMode::Output);
        self.io.configure(pins.si, PinMode::Output);
        self.io.configure(pins.analog1, PinMode::Input);
        self.io.configure(pins.analog2, PinMode::Input);
    }

    /// 清空移位寄存器
    ///
    /// 上电后寄存器内容未知，先打 1082 个时钟清掉残留标记，再注入一个新标记并
    /// 用同样多的时钟把它完整移出，寄存器由此进入无标记的确定状态。
    pub fn flush(&mut self) {
        self.counters = PulseCounters::default();

        let pins = self.pins;
        self.io.set_low(pins.si);
        self.io.set_low(pins.clock);

        self.clock_pulses(FLUSH_CLOCKS);
        self.si_pulse();
        self.clock_pulses(FLUSH_CLOCKS);

        self.metrics.add_pulses(self.counters.clock, self.counters.si);
        self.metrics.flushes_total.fetch_add(1, Ordering::Relaxed);
        debug!(
            "TSL1410R register flushed: {} clock pulses, {} SI pulse",
            self.counters.clock, self.counters.si
        );
    }

    /// 采集一帧
    ///
    /// `buffer` 必须恰好为 [`FRAME_BYTES`]（2560）字节，否则返回
    /// [`DriverError::InvalidArgument`] 且不触碰任何引脚。
    ///
    /// 成功时缓冲区的每个字节都被覆盖一次：AO1 的 640 个像素写入前半部分，
    /// AO2 的 640 个像素写入后半部分，每像素 2 字节大端（原始值左移 2 位）。
    ///
    /// 调用会阻塞约 `传播窗口 + exposure_us + 读出` 的时间，无法取消。
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<CaptureReport, DriverError> {
        if buffer.len() != FRAME_BYTES {
            self.metrics.invalid_buffers.fetch_add(1, Ordering::Relaxed);
            warn!(
                "Rejected frame buffer of {} bytes (expected {})",
                buffer.len(),
                FRAME_BYTES
            );
            return Err(DriverError::buffer_length(FRAME_BYTES, buffer.len()));
        }

        let started = Instant::now();
        let capture_seq = self.captures;
        let exposure_us = self.exposure_us;
        self.counters = PulseCounters::default();

        // 1. 起始标记：开始新的积分周期
        self.enter(CapturePhase::MarkerStart);
        self.si_pulse();

        // 2. 传播窗口：标记逐位移出寄存器，所有像素持续积分
        self.enter(CapturePhase::Propagating);
        for pulse in 0..REGISTER_LENGTH {
            if pulse == INTEGRATION_START_PULSE && !self.hooks.is_empty() {
                self.hooks.trigger_integration_start(capture_seq);
            }
            self.clock_pulse();
        }

        // 3. 额外曝光（可以为 0）
        self.enter(CapturePhase::ExtraExposure);
        self.delay.delay_us(exposure_us);

        // 4. 停止标记：所有像素同时停止积分并锁存
        self.enter(CapturePhase::MarkerStop);
        self.si_pulse();

        // 5. 读出：先采样再打时钟，当前输出的是上一个时钟呈现的像素对
        self.enter(CapturePhase::Reading);
        self.read_out(buffer);

        self.enter(CapturePhase::Idle);

        let report = CaptureReport {
            capture_seq,
            exposure_us,
            clock_pulses: self.counters.clock,
            si_pulses: self.counters.si,
            samples: self.counters.samples,
            elapsed: started.elapsed(),
        };

        self.captures += 1;
        self.metrics.add_pulses(report.clock_pulses, report.si_pulses);
        self.metrics.samples_total.fetch_add(report.samples, Ordering::Relaxed);
        self.metrics.frames_captured.fetch_add(1, Ordering::Relaxed);

        if !self.hooks.is_empty() {
            self.hooks.trigger_frame_captured(&report);
        }

        trace!(
            "Frame {} captured in {:?} (exposure {}us)",
            capture_seq, report.elapsed, exposure_us
        );
        Ok(report)
    }

    fn read_out(&mut self, buffer: &mut [u8]) {
        let (first_half, second_half) = buffer.split_at_mut(FRAME_BYTES / 2);
        let pixels = first_half
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(second_half.chunks_exact_mut(BYTES_PER_PIXEL));

        for (ch1, ch2) in pixels {
            let pair: SamplePair = self.sampler.sample_pair(self.pins.analog1, self.pins.analog2);
            self.counters.samples += 1;

            self.clock_pulse();

            ch1.copy_from_slice(&pack_sample(pair.ch1));
            ch2.copy_from_slice(&pack_sample(pair.ch2));
        }
    }

    fn enter(&mut self, phase: CapturePhase) {
        trace!("Capture phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    #[inline]
    fn clock_pulse(&mut self) {
        let clock = self.pins.clock;
        self.io.set_high(clock);
        self.io.set_low(clock);
        self.counters.clock += 1;
    }

    fn clock_pulses(&mut self, count: usize) {
        for _ in 0..count {
            self.clock_pulse();
        }
    }

    /// SI 脉冲：SI 在 CLK 高电平期间拉低，满足 SI 的保持时间要求
    fn si_pulse(&mut self) {
        let pins = self.pins;
        self.io.set_high(pins.si);
        self.io.set_high(pins.clock);
        self.io.set_low(pins.si);
        self.io.set_low(pins.clock);
        self.counters.clock += 1;
        self.counters.si += 1;
    }

    /// 当前额外曝光时间（微秒）
    pub fn exposure_us(&self) -> u32 {
        self.exposure_us
    }

    /// 设置额外曝光时间（微秒），下一帧生效
    ///
    /// 不做范围校验，0 合法。
    pub fn set_exposure_us(&mut self, exposure_us: u32) {
        debug!("Exposure set to {}us", exposure_us);
        self.exposure_us = exposure_us;
    }

    /// 以 `Duration` 设置额外曝光时间（超出 u32 微秒时饱和）
    pub fn set_exposure(&mut self, exposure: Duration) {
        let us = u32::try_from(exposure.as_micros()).unwrap_or(u32::MAX);
        self.set_exposure_us(us);
    }

    pub fn exposure(&self) -> Duration {
        Duration::from_micros(u64::from(self.exposure_us))
    }

    pub fn pins(&self) -> SensorPins {
        self.pins
    }

    /// 当前采集阶段（`read` 返回后恒为 Idle）
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// 成功采集的帧数
    pub fn captures(&self) -> u64 {
        self.captures
    }

    pub fn metrics(&self) -> &Arc<SensorMetrics> {
        &self.metrics
    }

    pub fn add_hook(&mut self, callback: Arc<dyn CaptureCallback>) {
        self.hooks.add_callback(callback);
    }

    pub fn hooks_mut(&mut self) -> &mut HookManager {
        &mut self.hooks
    }

    /// 释放驱动，取回三种硬件能力
    pub fn release(self) -> (IO, ADC, D) {
        (self.io, self.sampler, self.delay)
    }
}
