//! # TSL1410R Driver
//!
//! 线阵光电二极管传感器 TSL1410R 的时序驱动，包括：
//! - 寄存器清空（上电初始化）
//! - 曝光与全局快门锁存
//! - 双通道并行读出与打包
//! - 钩子系统：积分开始 / 帧完成回调
//! - 原子性能指标
//!
//! 驱动只依赖 [`tsl_hal`] 中的三种能力 trait，不绑定任何具体平台。
//!
//! # 使用示例
//!
//! ```rust
//! use tsl_driver::{FRAME_BYTES, SensorBuilder};
//! use tsl_hal::mock::{SimConfig, SimulatedSensor};
//!
//! let sim = SimulatedSensor::new(SimConfig::default());
//! let mut sensor = SensorBuilder::new()
//!     .pins(sim.pins())
//!     .build(sim.io(), sim.sampler(), sim.delay())
//!     .unwrap();
//!
//! let mut frame = [0u8; FRAME_BYTES];
//! sensor.read(&mut frame).unwrap();
//! ```

mod builder;
mod error;
pub mod frame;
pub mod hooks;
pub mod metrics;
pub mod phase;
mod sensor;

pub use builder::SensorBuilder;
pub use error::DriverError;
pub use frame::{DEFAULT_EXPOSURE_US, FRAME_BYTES, PIXEL_COUNT, PIXEL_PAIRS};
pub use hooks::{CaptureCallback, CaptureEvent, ChannelHook, HookManager};
pub use metrics::{MetricsSnapshot, SensorMetrics};
pub use phase::CapturePhase;
pub use sensor::{CaptureReport, Tsl1410r};

pub use tsl_hal::{PinId, SensorPins};
