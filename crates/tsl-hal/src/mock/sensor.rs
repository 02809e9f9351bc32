//! 引脚级 TSL1410R 模拟器
//!
//! 模型（参照数据手册的时序图）：
//!
//! - CLK 上升沿时若 SI 为高，视为一个标记：锁存上一积分窗口的电荷，读出位置归零
//! - 标记之后每个 CLK 上升沿，读出位置 +1；第 18 个上升沿时光电二极管重新开始积分
//! - 模拟输出呈现位置 `k` 的像素对 `(k, k + 640)`，超出 640 后输出为 0
//! - 虚拟时钟：每个 CLK 上升沿前进 `clock_period_ns`，延时按请求的微秒数前进
//! - 锁存值 = `光照强度 × 积分时间`，截断到 ADC 满量程

use crate::{DelayUs, DigitalIo, Level, PinId, PinMode, SamplePair, SensorPins, SyncSampler};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// 每段像素数（两段并行）
const SECTION_PIXELS: usize = 640;
/// 标记后第几个时钟开始积分
const INTEGRATION_START_CLOCK: u32 = 18;

/// 光照分布（单位：ADC 计数 / 微秒积分时间）
#[derive(Debug, Clone, PartialEq)]
pub enum LightProfile {
    /// 均匀光照
    Flat(f32),
    /// 从第 0 个像素线性变化到最后一个像素
    Ramp { start: f32, end: f32 },
    /// 背景 + 三角形亮峰
    Peak {
        center: usize,
        width: f32,
        height: f32,
        floor: f32,
    },
}

impl LightProfile {
    /// 像素 `pixel`（0..1280）的光照强度
    pub fn intensity(&self, pixel: usize) -> f32 {
        let last = (2 * SECTION_PIXELS - 1) as f32;
        match *self {
            Self::Flat(level) => level,
            Self::Ramp { start, end } => start + (end - start) * (pixel as f32 / last),
            Self::Peak {
                center,
                width,
                height,
                floor,
            } => {
                let distance = (pixel as f32 - center as f32).abs();
                if width <= 0.0 || distance >= width {
                    floor
                } else {
                    floor + height * (1.0 - distance / width)
                }
            },
        }
    }
}

impl Default for LightProfile {
    fn default() -> Self {
        Self::Flat(1.0)
    }
}

/// 模拟器配置
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub pins: SensorPins,
    /// 一个完整 CLK 周期的虚拟耗时（纳秒）
    pub clock_period_ns: u64,
    /// ADC 位宽
    pub adc_bits: u8,
    pub profile: LightProfile,
    /// 是否记录逐事件轨迹（每帧约 7000 条）
    pub trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            pins: SensorPins::default(),
            clock_period_ns: 1_000,
            adc_bits: 12,
            profile: LightProfile::default(),
            trace: false,
        }
    }
}

/// 轨迹事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Configure { pin: PinId, mode: PinMode },
    Level { pin: PinId, level: Level },
    /// 采样时的读出位置（`None` 表示尚未出现过标记）
    Sample { position: Option<u32> },
    Delay { us: u32 },
}

/// 引脚活动统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimStats {
    /// CLK 上升沿总数
    pub clock_pulses: u64,
    /// 标记（CLK 上升沿时 SI 为高）总数
    pub si_markers: u64,
    /// 同步采样次数
    pub samples: u64,
    /// 累计延时（微秒）
    pub delay_us_total: u64,
    /// 对未配置为输出的引脚写电平的次数
    pub misconfigured_writes: u64,
}

struct SimState {
    config: SimConfig,
    modes: HashMap<PinId, PinMode>,
    clock_high: bool,
    si_high: bool,
    now_ns: u64,
    position: Option<u32>,
    integration_started_ns: Option<u64>,
    last_integration_ns: Option<u64>,
    latched: Vec<u16>,
    stats: SimStats,
    trace: Vec<SimEvent>,
}

impl SimState {
    fn new(config: SimConfig) -> Self {
        Self {
            config,
            modes: HashMap::new(),
            clock_high: false,
            si_high: false,
            now_ns: 0,
            position: None,
            integration_started_ns: None,
            last_integration_ns: None,
            latched: vec![0; 2 * SECTION_PIXELS],
            stats: SimStats::default(),
            trace: Vec::new(),
        }
    }

    fn record(&mut self, event: SimEvent) {
        if self.config.trace {
            self.trace.push(event);
        }
    }

    fn full_scale(&self) -> u16 {
        let bits = u32::from(self.config.adc_bits.min(16));
        ((1u32 << bits) - 1) as u16
    }

    fn set_level(&mut self, pin: PinId, level: Level) {
        self.record(SimEvent::Level { pin, level });

        if self.modes.get(&pin) != Some(&PinMode::Output) {
            self.stats.misconfigured_writes += 1;
        }

        let pins = self.config.pins;
        if pin == pins.si {
            self.si_high = level.is_high();
        } else if pin == pins.clock {
            let rising = level.is_high() && !self.clock_high;
            self.clock_high = level.is_high();
            if rising {
                self.on_clock_rising();
            }
        }
    }

    fn on_clock_rising(&mut self) {
        self.now_ns += self.config.clock_period_ns;
        self.stats.clock_pulses += 1;

        if self.si_high {
            self.stats.si_markers += 1;
            self.latch();
            self.position = Some(0);
            return;
        }

        if let Some(position) = self.position {
            let next = position.saturating_add(1);
            self.position = Some(next);
            if next == INTEGRATION_START_CLOCK {
                self.integration_started_ns = Some(self.now_ns);
            }
        }
    }

    fn latch(&mut self) {
        let integration_ns = self
            .integration_started_ns
            .take()
            .map(|start| self.now_ns.saturating_sub(start));
        self.last_integration_ns = integration_ns;

        let integration_us = integration_ns.unwrap_or(0) as f32 / 1_000.0;
        let full_scale = self.full_scale();
        let profile = self.config.profile.clone();
        for (pixel, value) in self.latched.iter_mut().enumerate() {
            let charge = (profile.intensity(pixel) * integration_us).max(0.0);
            *value = charge.min(f32::from(full_scale)) as u16;
        }
    }

    fn sample(&mut self, analog1: PinId, analog2: PinId) -> SamplePair {
        self.stats.samples += 1;
        self.record(SimEvent::Sample {
            position: self.position,
        });

        let (ch1, ch2) = match self.position {
            Some(k) if (k as usize) < SECTION_PIXELS => {
                let k = k as usize;
                (self.latched[k], self.latched[k + SECTION_PIXELS])
            },
            _ => (0, 0),
        };

        let pins = self.config.pins;
        let read = |pin: PinId| {
            if pin == pins.analog1 {
                ch1
            } else if pin == pins.analog2 {
                ch2
            } else {
                0
            }
        };
        SamplePair::new(read(analog1), read(analog2))
    }

    fn delay(&mut self, us: u32) {
        self.record(SimEvent::Delay { us });
        self.stats.delay_us_total += u64::from(us);
        self.now_ns += u64::from(us) * 1_000;
    }
}

/// 引脚级传感器模拟器
///
/// # 示例
///
/// ```rust
/// use tsl_hal::mock::{SimConfig, SimulatedSensor};
/// use tsl_hal::{DigitalIo, PinMode};
///
/// let sim = SimulatedSensor::new(SimConfig::default());
/// let pins = sim.pins();
/// let mut io = sim.io();
/// io.configure(pins.clock, PinMode::Output);
/// io.set_high(pins.clock);
/// io.set_low(pins.clock);
/// assert_eq!(sim.stats().clock_pulses, 1);
/// ```
#[derive(Clone)]
pub struct SimulatedSensor {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSensor {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::new(config))),
        }
    }

    /// 数字 IO 句柄
    pub fn io(&self) -> SimIo {
        SimIo {
            state: self.state.clone(),
        }
    }

    /// 同步采样句柄
    pub fn sampler(&self) -> SimSampler {
        SimSampler {
            state: self.state.clone(),
        }
    }

    /// 虚拟时钟延时句柄
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            state: self.state.clone(),
        }
    }

    pub fn pins(&self) -> SensorPins {
        self.state.lock().config.pins
    }

    pub fn stats(&self) -> SimStats {
        self.state.lock().stats
    }

    pub fn reset_stats(&self) {
        self.state.lock().stats = SimStats::default();
    }

    /// 虚拟时钟（纳秒）
    pub fn now_ns(&self) -> u64 {
        self.state.lock().now_ns
    }

    /// 最近一次锁存对应的积分时间（纳秒）
    pub fn last_integration_ns(&self) -> Option<u64> {
        self.state.lock().last_integration_ns
    }

    /// 最近一次锁存的 1280 个像素值（ADC 原始值）
    pub fn latched_pixels(&self) -> Vec<u16> {
        self.state.lock().latched.clone()
    }

    pub fn pin_mode(&self, pin: PinId) -> Option<PinMode> {
        self.state.lock().modes.get(&pin).copied()
    }

    pub fn set_profile(&self, profile: LightProfile) {
        self.state.lock().config.profile = profile;
    }

    pub fn trace(&self) -> Vec<SimEvent> {
        self.state.lock().trace.clone()
    }

    pub fn clear_trace(&self) {
        self.state.lock().trace.clear();
    }
}

/// [`SimulatedSensor`] 的数字 IO 句柄
pub struct SimIo {
    state: Arc<Mutex<SimState>>,
}

impl DigitalIo for SimIo {
    fn configure(&mut self, pin: PinId, mode: PinMode) {
        let mut state = self.state.lock();
        state.record(SimEvent::Configure { pin, mode });
        state.modes.insert(pin, mode);
    }

    fn set_level(&mut self, pin: PinId, level: Level) {
        self.state.lock().set_level(pin, level);
    }
}

/// [`SimulatedSensor`] 的同步采样句柄
pub struct SimSampler {
    state: Arc<Mutex<SimState>>,
}

impl SyncSampler for SimSampler {
    fn sample_pair(&mut self, analog1: PinId, analog2: PinId) -> SamplePair {
        self.state.lock().sample(analog1, analog2)
    }
}

/// [`SimulatedSensor`] 的虚拟时钟延时句柄（不真正阻塞）
pub struct SimDelay {
    state: Arc<Mutex<SimState>>,
}

impl DelayUs for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.state.lock().delay(us);
    }
}
