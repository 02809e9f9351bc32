//! # 传感器配置
//!
//! 接线与采集参数，持久化为 TOML：
//!
//! ```toml
//! [pins]
//! clock = 24
//! si = 25
//! analog1 = 14
//! analog2 = 39
//!
//! [capture]
//! exposure_us = 500
//! clock_period_ns = 1000
//! ```
//!
//! 缺失的字段取默认值。

use crate::error::ToolsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tsl_driver::DEFAULT_EXPOSURE_US;
use tsl_hal::{PinId, SensorPins};

/// 传感器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// 接线
    pub pins: PinConfig,

    /// 采集参数
    pub capture: CaptureConfig,
}

impl SensorConfig {
    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, ToolsError> {
        Ok(toml::from_str(content)?)
    }

    /// 序列化为 TOML 文本
    pub fn to_toml_string(&self) -> Result<String, ToolsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 从文件加载配置
    ///
    /// 配置文件路径（由 CLI 决定）：
    /// - Linux: `~/.config/tsl1410r/config.toml`
    /// - macOS: `~/Library/Application Support/tsl1410r/config.toml`
    /// - Windows: `%APPDATA%\tsl1410r\config.toml`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ToolsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 加载配置，文件不存在时返回默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ToolsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// 保存配置到文件（自动创建父目录）
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ToolsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 按 `section.key` 修改单个字段
    ///
    /// 支持的键：`pins.clock`、`pins.si`、`pins.analog1`、`pins.analog2`、
    /// `capture.exposure_us`、`capture.clock_period_ns`。
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ToolsError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ToolsError> {
            value.trim().parse().map_err(|_| ToolsError::InvalidSetting {
                key: key.to_string(),
                value: value.to_string(),
            })
        }

        match key {
            "pins.clock" => self.pins.clock = parse(key, value)?,
            "pins.si" => self.pins.si = parse(key, value)?,
            "pins.analog1" => self.pins.analog1 = parse(key, value)?,
            "pins.analog2" => self.pins.analog2 = parse(key, value)?,
            "capture.exposure_us" => self.capture.exposure_us = parse(key, value)?,
            "capture.clock_period_ns" => self.capture.clock_period_ns = parse(key, value)?,
            _ => return Err(ToolsError::UnknownSetting(key.to_string())),
        }
        Ok(())
    }
}

/// 接线配置（平台引脚编号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub clock: u8,
    pub si: u8,
    pub analog1: u8,
    pub analog2: u8,
}

impl PinConfig {
    /// 转换为驱动使用的引脚分配
    pub fn to_sensor_pins(self) -> SensorPins {
        SensorPins::new(
            PinId(self.clock),
            PinId(self.si),
            PinId(self.analog1),
            PinId(self.analog2),
        )
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        let pins = SensorPins::default();
        Self {
            clock: pins.clock.number(),
            si: pins.si.number(),
            analog1: pins.analog1.number(),
            analog2: pins.analog2.number(),
        }
    }
}

impl From<SensorPins> for PinConfig {
    fn from(pins: SensorPins) -> Self {
        Self {
            clock: pins.clock.number(),
            si: pins.si.number(),
            analog1: pins.analog1.number(),
            analog2: pins.analog2.number(),
        }
    }
}

/// 采集参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// 额外曝光时长（µs）
    pub exposure_us: u32,

    /// 仿真后端的时钟周期（ns）
    pub clock_period_ns: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            exposure_us: DEFAULT_EXPOSURE_US,
            clock_period_ns: 1000,
        }
    }
}
