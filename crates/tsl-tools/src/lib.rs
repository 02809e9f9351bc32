//! # TSL Tools - 共享数据结构和算法
//!
//! **依赖原则**: 只依赖 `tsl-driver` 的帧布局常量，不引入任何硬件后端
//!
//! ## 包含模块
//!
//! - `frame` - 帧缓冲区解码（纯函数）
//! - `statistics` - 帧统计（纯函数）
//! - `config` - 传感器配置文件（TOML）

pub mod config;
mod error;
pub mod frame;
pub mod statistics;

// 重新导出常用类型
pub use config::{CaptureConfig, PinConfig, SensorConfig};
pub use error::ToolsError;
pub use frame::{Channel, CsvWriter, Frame, write_csv};
pub use statistics::FrameStatistics;
