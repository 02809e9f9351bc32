//! Builder 模式实现
//!
//! 提供链式构造 `Tsl1410r` 实例的便捷方式。

use crate::error::DriverError;
use crate::frame::DEFAULT_EXPOSURE_US;
use crate::hooks::{CaptureCallback, HookManager};
use crate::metrics::SensorMetrics;
use crate::sensor::Tsl1410r;
use std::sync::Arc;
use tsl_hal::{DelayUs, DigitalIo, PinId, SensorPins, SyncSampler};

/// Tsl1410r Builder（链式构造）
///
/// # Example
///
/// ```rust
/// use tsl_driver::SensorBuilder;
/// use tsl_hal::mock::{SimConfig, SimulatedSensor};
///
/// let sim = SimulatedSensor::new(SimConfig::default());
/// let sensor = SensorBuilder::new()
///     .pins(sim.pins())
///     .exposure_us(1_000)
///     .build(sim.io(), sim.sampler(), sim.delay())
///     .unwrap();
/// assert_eq!(sensor.exposure_us(), 1_000);
/// ```
pub struct SensorBuilder {
    /// 引脚分配（默认参考接线）
    pins: SensorPins,
    /// 额外曝光时间（微秒）
    exposure_us: Option<u32>,
    hooks: HookManager,
    /// 外部共享的指标（不设置则新建）
    metrics: Option<Arc<SensorMetrics>>,
}

impl SensorBuilder {
    pub fn new() -> Self {
        Self {
            pins: SensorPins::default(),
            exposure_us: None,
            hooks: HookManager::new(),
            metrics: None,
        }
    }

    pub fn pins(mut self, pins: SensorPins) -> Self {
        self.pins = pins;
        self
    }

    pub fn clock_pin(mut self, pin: impl Into<PinId>) -> Self {
        self.pins.clock = pin.into();
        self
    }

    pub fn si_pin(mut self, pin: impl Into<PinId>) -> Self {
        self.pins.si = pin.into();
        self
    }

    pub fn analog_pins(mut self, analog1: impl Into<PinId>, analog2: impl Into<PinId>) -> Self {
        self.pins.analog1 = analog1.into();
        self.pins.analog2 = analog2.into();
        self
    }

    /// 设置额外曝光时间（可选，默认 500us）
    pub fn exposure_us(mut self, exposure_us: u32) -> Self {
        self.exposure_us = Some(exposure_us);
        self
    }

    /// 注册采集回调（可多次调用）
    pub fn hook(mut self, callback: Arc<dyn CaptureCallback>) -> Self {
        self.hooks.add_callback(callback);
        self
    }

    /// 使用外部共享的指标实例
    pub fn metrics(mut self, metrics: Arc<SensorMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// 构建驱动
    ///
    /// 校验四个引脚互不相同，然后配置引脚并清空传感器寄存器。
    ///
    /// # Errors
    /// - `DriverError::InvalidArgument`: 引脚重复
    pub fn build<IO, ADC, D>(
        self,
        io: IO,
        sampler: ADC,
        delay: D,
    ) -> Result<Tsl1410r<IO, ADC, D>, DriverError>
    where
        IO: DigitalIo,
        ADC: SyncSampler,
        D: DelayUs,
    {
        if !self.pins.is_distinct() {
            return Err(DriverError::InvalidArgument(format!(
                "sensor pins must be distinct: {:?}",
                self.pins
            )));
        }

        Ok(Tsl1410r::with_parts(
            self.pins,
            io,
            sampler,
            delay,
            self.exposure_us.unwrap_or(DEFAULT_EXPOSURE_US),
            self.hooks,
            self.metrics.unwrap_or_default(),
        ))
    }
}

impl Default for SensorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
