//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
///
/// 数字 IO、采样与延时在本层视为不会失败，唯一可观察的错误是调用方违反参数约定。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// 无效参数（缓冲区长度不符、引脚重复等）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DriverError {
    pub(crate) fn buffer_length(expected: usize, actual: usize) -> Self {
        Self::InvalidArgument(format!(
            "frame buffer must be {} bytes, got {}",
            expected, actual
        ))
    }
}
