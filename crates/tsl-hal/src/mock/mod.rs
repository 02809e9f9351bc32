//! Mock 硬件（无硬件依赖）
//!
//! - [`SimulatedSensor`]：引脚级传感器模拟器，跟踪 SI/CLK 电平、移位寄存器位置与虚拟时钟
//! - [`ScriptedSampler`]：按迭代序号返回确定性采样值的采样器
//!
//! 模拟器的三个句柄（`io()` / `sampler()` / `delay()`）共享同一份状态，
//! 可以分别注入驱动，测试结束后再通过 [`SimulatedSensor::stats`] 检查引脚活动。

mod sensor;

pub use sensor::{
    LightProfile, SimConfig, SimDelay, SimEvent, SimIo, SimSampler, SimStats, SimulatedSensor,
};

use crate::{PinId, SamplePair, SyncSampler};

/// 脚本化采样器
///
/// 第 n 次调用返回 `script(n)`，`reset()` 后序号归零。
pub struct ScriptedSampler<F> {
    script: F,
    calls: usize,
    last_pins: Option<(PinId, PinId)>,
}

impl<F> ScriptedSampler<F>
where
    F: FnMut(usize) -> SamplePair,
{
    pub fn new(script: F) -> Self {
        Self {
            script,
            calls: 0,
            last_pins: None,
        }
    }

    /// 已采样次数
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// 最近一次采样使用的引脚
    pub fn last_pins(&self) -> Option<(PinId, PinId)> {
        self.last_pins
    }

    pub fn reset(&mut self) {
        self.calls = 0;
        self.last_pins = None;
    }
}

impl<F> SyncSampler for ScriptedSampler<F>
where
    F: FnMut(usize) -> SamplePair,
{
    fn sample_pair(&mut self, analog1: PinId, analog2: PinId) -> SamplePair {
        let pair = (self.script)(self.calls);
        self.calls += 1;
        self.last_pins = Some((analog1, analog2));
        pair
    }
}
