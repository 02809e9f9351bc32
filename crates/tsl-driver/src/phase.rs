//! 采集状态机
//!
//! 单线程顺序执行，每次 `read` 依次经过：
//!
//! ```text
//! Idle → MarkerStart → Propagating → ExtraExposure → MarkerStop → Reading → Idle
//! ```

use std::fmt;

/// 采集阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    /// 空闲（每次 `read` 的起点和终点）
    #[default]
    Idle,

    /// 注入起始标记
    MarkerStart,

    /// 标记在寄存器中传播（1080 个时钟），所有像素持续积分
    Propagating,

    /// 额外曝光延时
    ExtraExposure,

    /// 注入停止标记，所有像素同时停止积分并锁存（全局快门）
    MarkerStop,

    /// 读出 640 个像素对
    Reading,
}

impl CapturePhase {
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::MarkerStart => "marker-start",
            Self::Propagating => "propagating",
            Self::ExtraExposure => "extra-exposure",
            Self::MarkerStop => "marker-stop",
            Self::Reading => "reading",
        }
    }
}

impl fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
