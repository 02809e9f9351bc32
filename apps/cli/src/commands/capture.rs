//! 采集命令
//!
//! 驱动仿真传感器采集若干帧，打印统计信息并可选地保存数据

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tsl_driver::frame::SAMPLE_SHIFT;
use tsl_driver::{CaptureEvent, ChannelHook, FRAME_BYTES, SensorBuilder};
use tsl_hal::mock::{LightProfile, SimConfig, SimulatedSensor};
use tsl_tools::statistics::centroid;
use tsl_tools::{CsvWriter, Frame, FrameStatistics, SensorConfig};

/// 12 位 ADC 满量程打包后的值
const SATURATION: u16 = 4095 << SAMPLE_SHIFT;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// 驱动缓冲区原样拼接（每帧 2560 字节）
    Raw,
    /// `frame,pixel,value`
    Csv,
}

/// 仿真光照分布
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    /// 均匀光照
    Flat,
    /// 线性渐变
    Ramp,
    /// 中心亮峰
    Peak,
}

impl ProfileArg {
    fn light_profile(self) -> LightProfile {
        match self {
            ProfileArg::Flat => LightProfile::Flat(1.0),
            ProfileArg::Ramp => LightProfile::Ramp {
                start: 0.2,
                end: 2.0,
            },
            ProfileArg::Peak => LightProfile::Peak {
                center: 640,
                width: 40.0,
                height: 2.0,
                floor: 0.3,
            },
        }
    }
}

/// 采集命令参数
#[derive(Args, Debug)]
pub struct CaptureCommand {
    /// 采集帧数
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,

    /// 额外曝光时长（µs，覆盖配置）
    #[arg(short, long)]
    pub exposure_us: Option<u32>,

    /// 输出文件路径（CSV 未指定时写到 stdout）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出格式
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Raw)]
    pub format: OutputFormat,

    /// 仿真光照分布
    #[arg(short, long, value_enum, default_value_t = ProfileArg::Flat)]
    pub profile: ProfileArg,

    /// 以 JSON 行输出每帧统计
    #[arg(long)]
    pub json: bool,
}

impl CaptureCommand {
    /// 执行采集
    pub fn execute(&self, config: &SensorConfig) -> Result<()> {
        let sim = SimulatedSensor::new(SimConfig {
            pins: config.pins.to_sensor_pins(),
            clock_period_ns: config.capture.clock_period_ns,
            profile: self.profile.light_profile(),
            ..SimConfig::default()
        });

        let exposure_us = self.exposure_us.unwrap_or(config.capture.exposure_us);
        let (hook, events) = ChannelHook::new();
        let mut sensor = SensorBuilder::new()
            .pins(sim.pins())
            .exposure_us(exposure_us)
            .hook(Arc::new(hook))
            .build(sim.io(), sim.sampler(), sim.delay())
            .context("初始化传感器失败")?;

        info!(count = self.count, exposure_us, profile = ?self.profile, "capturing");

        let mut sink = FrameSink::open(self.format, self.output.as_deref())?;
        let mut buffer = [0u8; FRAME_BYTES];
        for index in 0..self.count {
            sensor.read(&mut buffer).context("采集失败")?;
            let frame = Frame::from_bytes(&buffer)?;
            self.report(index, &frame, sink.uses_stdout())?;
            sink.write(&buffer, &frame).context("写入帧数据失败")?;
        }
        sink.finish().context("写入帧数据失败")?;

        let integration_starts = events
            .try_iter()
            .filter(|event| matches!(event, CaptureEvent::IntegrationStart { .. }))
            .count();
        let metrics = sensor.metrics().snapshot();
        debug!(
            integration_starts,
            clock_pulses = metrics.clock_pulses_total,
            samples = metrics.samples_total,
            virtual_ns = sim.now_ns(),
            "capture finished"
        );

        if let Some(path) = &self.output {
            info!(path = %path.display(), frames = self.count, "frames written");
        }
        Ok(())
    }

    /// 打印一帧的统计
    ///
    /// CSV 占用 stdout 时统计走日志（stderr）。
    fn report(&self, index: u32, frame: &Frame, stdout_taken: bool) -> Result<()> {
        let stats = FrameStatistics::of_frame(frame, SATURATION);

        let line = if self.json {
            serde_json::to_string(&stats)?
        } else {
            format!(
                "帧 {}: min={} max={} mean={:.1} std={:.1} peak={} saturated={} centroid={}",
                index,
                stats.min,
                stats.max,
                stats.mean,
                stats.std_dev,
                stats.peak_pixel,
                stats.saturated_pixels,
                centroid(frame.pixels()).map_or_else(|| "-".to_string(), |c| format!("{:.2}", c)),
            )
        };

        if stdout_taken {
            info!("{}", line);
        } else {
            println!("{}", line);
        }
        Ok(())
    }
}

/// 帧数据的输出目标（逐帧写出）
enum FrameSink {
    /// 未指定输出文件的 raw 格式：只打印统计
    Discard,
    Raw(BufWriter<File>),
    CsvFile(CsvWriter<BufWriter<File>>),
    CsvStdout(CsvWriter<io::StdoutLock<'static>>),
}

impl FrameSink {
    fn open(format: OutputFormat, output: Option<&Path>) -> Result<Self> {
        let create = |path: &Path| {
            File::create(path)
                .map(BufWriter::new)
                .with_context(|| format!("创建文件失败: {}", path.display()))
        };

        Ok(match (format, output) {
            (OutputFormat::Raw, None) => {
                debug!("no output path, raw frames discarded");
                FrameSink::Discard
            },
            (OutputFormat::Raw, Some(path)) => FrameSink::Raw(create(path)?),
            (OutputFormat::Csv, Some(path)) => FrameSink::CsvFile(CsvWriter::new(create(path)?)?),
            (OutputFormat::Csv, None) => FrameSink::CsvStdout(CsvWriter::new(io::stdout().lock())?),
        })
    }

    fn uses_stdout(&self) -> bool {
        matches!(self, FrameSink::CsvStdout(_))
    }

    fn write(&mut self, buffer: &[u8], frame: &Frame) -> io::Result<()> {
        match self {
            FrameSink::Discard => Ok(()),
            FrameSink::Raw(writer) => writer.write_all(buffer),
            FrameSink::CsvFile(csv) => csv.write_frame(frame),
            FrameSink::CsvStdout(csv) => csv.write_frame(frame),
        }
    }

    fn finish(self) -> io::Result<()> {
        match self {
            FrameSink::Discard => Ok(()),
            FrameSink::Raw(mut writer) => writer.flush(),
            FrameSink::CsvFile(csv) => csv.finish().map(drop),
            FrameSink::CsvStdout(csv) => csv.finish().map(drop),
        }
    }
}
