//! # TSL CLI
//!
//! Command-line interface for the TSL1410R linear sensor array.
//!
//! 当前使用仿真后端：按配置的接线驱动完整的时序协议，
//! 光照分布由 `--profile` 选择。
//!
//! ```bash
//! # 修改默认曝光
//! tsl-cli config set capture.exposure_us 800
//!
//! # 采集 10 帧并保存原始数据
//! tsl-cli capture --count 10 --output frames.bin
//!
//! # 以 CSV 输出一帧峰值光照
//! tsl-cli capture --profile peak --format csv
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{CaptureCommand, ConfigCommand};
use tsl_tools::SensorConfig;

/// TSL CLI - 线阵传感器命令行工具
#[derive(Parser, Debug)]
#[command(name = "tsl-cli")]
#[command(about = "Command-line interface for the TSL1410R linear sensor array", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认位于用户配置目录）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 采集帧
    Capture {
        #[command(flatten)]
        args: CaptureCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 留给数据）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tsl_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => commands::config::default_config_path()?,
    };

    match cli.command {
        Commands::Capture { args } => {
            let config = SensorConfig::load_or_default(&config_path)
                .with_context(|| format!("读取配置文件失败: {}", config_path.display()))?;
            args.execute(&config)
        },

        Commands::Config(cmd) => cmd.execute(&config_path),
    }
}
