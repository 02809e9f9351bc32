//! 延时实现

use crate::DelayUs;
use std::time::Duration;

/// 基于 spin_sleep 的微秒延时
///
/// `std::thread::sleep` 在桌面系统上的精度只有 1-2ms，曝光时间通常在几百微秒量级，
/// 因此使用 spin_sleep（先 sleep 后自旋）获得微秒级精度。
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl SpinDelay {
    pub const fn new() -> Self {
        Self
    }
}

impl DelayUs for SpinDelay {
    fn delay_us(&mut self, us: u32) {
        if us == 0 {
            return;
        }
        spin_sleep::sleep(Duration::from_micros(u64::from(us)));
    }
}

/// 空延时（立即返回）
///
/// 用于基准测试或不关心曝光时间的场景。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayUs for NoDelay {
    fn delay_us(&mut self, _us: u32) {}
}
