//! 配置管理命令
//!
//! 用于管理传感器配置（接线、曝光等）

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tracing::info;
use tsl_tools::SensorConfig;

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;

    path.push("tsl1410r");
    path.push("config.toml");
    Ok(path)
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示当前配置（TOML）
    Show,

    /// 设置配置项
    Set {
        /// 配置项（如 pins.clock, capture.exposure_us）
        key: String,

        /// 新值
        value: String,
    },

    /// 显示配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show(path),
            ConfigCommand::Set { key, value } => Self::set(path, &key, &value),
            ConfigCommand::Path => {
                println!("{}", path.display());
                Ok(())
            },
        }
    }

    fn show(path: &Path) -> Result<()> {
        let config = SensorConfig::load_or_default(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;

        print!("{}", config.to_toml_string()?);
        Ok(())
    }

    fn set(path: &Path, key: &str, value: &str) -> Result<()> {
        let mut config = SensorConfig::load_or_default(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;

        config.set(key, value)?;
        config
            .save_to_file(path)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;

        info!(key, value, "config updated");
        println!("✅ {} = {}", key, value.trim());
        Ok(())
    }
}
