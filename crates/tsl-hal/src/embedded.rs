//! embedded-hal 1.0 桥接
//!
//! 把平台 HAL 提供的 `OutputPin` / `DelayNs` 适配为本 crate 的能力 trait。
//! 只接受 `Error = Infallible` 的引脚：本层不处理 GPIO 写失败。
//!
//! 模拟输入与同步 ADC 在 embedded-hal 1.0 中没有统一 trait，需要平台自行实现 [`SyncSampler`](crate::SyncSampler)。

use crate::{DelayUs, DigitalIo, Level, PinId, PinMode};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// CLK / SI 两个输出引脚的 [`DigitalIo`] 适配器
///
/// 引脚方向在平台 HAL 构造 `OutputPin` 时已经确定，`configure` 只记录调用。
pub struct EmbeddedHalIo<CLK, SI> {
    clock_id: PinId,
    si_id: PinId,
    clock: CLK,
    si: SI,
}

impl<CLK, SI> EmbeddedHalIo<CLK, SI>
where
    CLK: OutputPin<Error = Infallible>,
    SI: OutputPin<Error = Infallible>,
{
    pub fn new(clock_id: PinId, clock: CLK, si_id: PinId, si: SI) -> Self {
        Self {
            clock_id,
            si_id,
            clock,
            si,
        }
    }

    /// 取回底层引脚
    pub fn release(self) -> (CLK, SI) {
        (self.clock, self.si)
    }
}

impl<CLK, SI> DigitalIo for EmbeddedHalIo<CLK, SI>
where
    CLK: OutputPin<Error = Infallible>,
    SI: OutputPin<Error = Infallible>,
{
    fn configure(&mut self, pin: PinId, mode: PinMode) {
        tracing::trace!("{} configured as {:?} (fixed by HAL)", pin, mode);
    }

    fn set_level(&mut self, pin: PinId, level: Level) {
        let result = if pin == self.clock_id {
            match level {
                Level::High => self.clock.set_high(),
                Level::Low => self.clock.set_low(),
            }
        } else if pin == self.si_id {
            match level {
                Level::High => self.si.set_high(),
                Level::Low => self.si.set_low(),
            }
        } else {
            tracing::warn!("{} is not an output owned by this adapter", pin);
            Ok(())
        };
        // Infallible
        let Ok(()) = result;
    }
}

/// `DelayNs` 的微秒延时适配器
pub struct EmbeddedHalDelay<D> {
    inner: D,
}

impl<D: DelayNs> EmbeddedHalDelay<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn release(self) -> D {
        self.inner
    }
}

impl<D: DelayNs> DelayUs for EmbeddedHalDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
    }
}
