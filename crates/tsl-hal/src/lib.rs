//! # TSL1410R Hardware Abstraction Layer
//!
//! 引脚级硬件抽象层，驱动只依赖这里定义的三种能力：
//!
//! - [`DigitalIo`]：配置引脚方向、设置数字输出电平
//! - [`SyncSampler`]：同步双通道模拟采样（两路在同一时刻转换）
//! - [`DelayUs`]：微秒级阻塞延时
//!
//! 平台相关的 GPIO / ADC 初始化不属于本层，由调用方实现上述 trait。
//!
//! ## Feature Flags
//!
//! - `mock`：提供 [`mock::SimulatedSensor`]，在引脚层面模拟传感器行为
//! - `embedded-hal`：提供 embedded-hal 1.0 的 `OutputPin` / `DelayNs` 桥接

mod delay;

#[cfg(feature = "embedded-hal")]
pub mod embedded;

#[cfg(feature = "mock")]
pub mod mock;

pub use delay::{NoDelay, SpinDelay};

use std::fmt;

/// 引脚编号
///
/// 仅作为标识符使用，合法性由平台的引脚配置层负责校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u8);

impl PinId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn number(self) -> u8 {
        self.0
    }
}

impl From<u8> for PinId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin{}", self.0)
    }
}

/// 数字电平
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

/// 引脚方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// 传感器的四个引脚角色
///
/// - `clock`：CLK，驱动内部移位寄存器
/// - `si`：SI（serial input），注入起始/停止标记
/// - `analog1` / `analog2`：两个并行模拟输出段（AO1 / AO2）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorPins {
    pub clock: PinId,
    pub si: PinId,
    pub analog1: PinId,
    pub analog2: PinId,
}

impl SensorPins {
    pub const fn new(clock: PinId, si: PinId, analog1: PinId, analog2: PinId) -> Self {
        Self {
            clock,
            si,
            analog1,
            analog2,
        }
    }

    /// 四个引脚是否两两不同
    pub fn is_distinct(&self) -> bool {
        let pins = self.as_array();
        pins.iter()
            .enumerate()
            .all(|(i, pin)| pins[i + 1..].iter().all(|other| other != pin))
    }

    pub fn as_array(&self) -> [PinId; 4] {
        [self.clock, self.si, self.analog1, self.analog2]
    }
}

impl Default for SensorPins {
    /// 参考接线（Teensy 3.6 评估板）
    fn default() -> Self {
        Self::new(PinId(24), PinId(25), PinId(14), PinId(39))
    }
}

/// 一次同步采样的结果
///
/// 两个通道各自的原始 ADC 读数（ADC 原生位宽，右对齐）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplePair {
    pub ch1: u16,
    pub ch2: u16,
}

impl SamplePair {
    pub const fn new(ch1: u16, ch2: u16) -> Self {
        Self { ch1, ch2 }
    }
}

/// 数字 IO 能力
///
/// 直接寄存器级访问，本层视为不会失败。
pub trait DigitalIo {
    fn configure(&mut self, pin: PinId, mode: PinMode);
    fn set_level(&mut self, pin: PinId, level: Level);

    fn set_high(&mut self, pin: PinId) {
        self.set_level(pin, Level::High);
    }

    fn set_low(&mut self, pin: PinId) {
        self.set_level(pin, Level::Low);
    }
}

/// 同步双通道采样能力
///
/// 实现必须保证两路在（尽可能）同一时刻完成转换，否则并行读出的像素配对会错位。
pub trait SyncSampler {
    fn sample_pair(&mut self, analog1: PinId, analog2: PinId) -> SamplePair;
}

/// 微秒延时能力
pub trait DelayUs {
    fn delay_us(&mut self, us: u32);
}

impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn configure(&mut self, pin: PinId, mode: PinMode) {
        (**self).configure(pin, mode);
    }

    fn set_level(&mut self, pin: PinId, level: Level) {
        (**self).set_level(pin, level);
    }
}

impl<T: SyncSampler + ?Sized> SyncSampler for &mut T {
    fn sample_pair(&mut self, analog1: PinId, analog2: PinId) -> SamplePair {
        (**self).sample_pair(analog1, analog2)
    }
}

impl<T: DelayUs + ?Sized> DelayUs for &mut T {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us);
    }
}
