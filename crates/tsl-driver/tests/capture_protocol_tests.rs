//! 采集时序集成测试（基于引脚级模拟器）

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tsl_driver::frame::{CLOCKS_PER_CAPTURE, CLOCKS_PER_FLUSH, REGISTER_LENGTH};
use tsl_driver::{
    CaptureCallback, CaptureEvent, ChannelHook, FRAME_BYTES, PIXEL_COUNT, PIXEL_PAIRS,
    SensorBuilder, Tsl1410r,
};
use tsl_hal::mock::{LightProfile, SimConfig, SimDelay, SimEvent, SimIo, SimSampler, SimulatedSensor};
use tsl_hal::{Level, SpinDelay};

type SimSensor = Tsl1410r<SimIo, SimSampler, SimDelay>;

fn sim_sensor(config: SimConfig) -> (SimulatedSensor, SimSensor) {
    let sim = SimulatedSensor::new(config);
    let sensor = SensorBuilder::new()
        .pins(sim.pins())
        .build(sim.io(), sim.sampler(), sim.delay())
        .unwrap();
    (sim, sensor)
}

fn decode(frame: &[u8]) -> Vec<u16> {
    frame.chunks_exact(2).map(|b| u16::from_be_bytes([b[0], b[1]])).collect()
}

#[test]
fn test_init_pulse_counts() {
    let (sim, sensor) = sim_sensor(SimConfig::default());
    let stats = sim.stats();

    assert_eq!(stats.clock_pulses, CLOCKS_PER_FLUSH as u64);
    assert_eq!(stats.si_markers, 1);
    assert_eq!(stats.samples, 0);
    assert_eq!(stats.misconfigured_writes, 0);

    let snapshot = sensor.metrics().snapshot();
    assert_eq!(snapshot.clock_pulses_total, 2165);
    assert_eq!(snapshot.si_pulses_total, 1);
    assert_eq!(snapshot.flushes_total, 1);
}

#[test]
fn test_pins_configured_by_role() {
    let (sim, sensor) = sim_sensor(SimConfig::default());
    let pins = sensor.pins();
    assert_eq!(sim.pin_mode(pins.clock), Some(tsl_hal::PinMode::Output));
    assert_eq!(sim.pin_mode(pins.si), Some(tsl_hal::PinMode::Output));
    assert_eq!(sim.pin_mode(pins.analog1), Some(tsl_hal::PinMode::Input));
    assert_eq!(sim.pin_mode(pins.analog2), Some(tsl_hal::PinMode::Input));
}

#[test]
fn test_pulse_counts_per_capture_are_independent_of_exposure() {
    let (sim, mut sensor) = sim_sensor(SimConfig::default());
    let mut frame = [0u8; FRAME_BYTES];

    for (seq, exposure) in [0u32, 500, 10_000].into_iter().enumerate() {
        sensor.set_exposure_us(exposure);
        sim.reset_stats();

        let report = sensor.read(&mut frame).unwrap();
        let stats = sim.stats();

        assert_eq!(stats.clock_pulses, 1722);
        assert_eq!(stats.si_markers, 2);
        assert_eq!(stats.samples, PIXEL_PAIRS as u64);
        assert_eq!(stats.delay_us_total, u64::from(exposure));

        assert_eq!(report.capture_seq, seq as u64);
        assert_eq!(report.exposure_us, exposure);
        assert_eq!(report.clock_pulses, CLOCKS_PER_CAPTURE as u64);
        assert_eq!(report.si_pulses, 2);
        assert_eq!(report.samples, 640);
    }

    let snapshot = sensor.metrics().snapshot();
    assert_eq!(snapshot.frames_captured, 3);
    assert_eq!(snapshot.clock_pulses_total, 2165 + 3 * 1722);
    assert_eq!(snapshot.si_pulses_total, 1 + 3 * 2);
    assert_eq!(snapshot.samples_total, 3 * 640);
    assert_eq!(snapshot.samples_per_frame(), 640.0);
}

#[test]
fn test_every_byte_overwritten() {
    let (_sim, mut sensor) = sim_sensor(SimConfig {
        profile: LightProfile::Flat(0.0),
        ..SimConfig::default()
    });

    // 全黑时每个像素都是 0，哨兵必须全部被覆盖
    let mut frame = [0xABu8; FRAME_BYTES];
    sensor.read(&mut frame).unwrap();
    assert!(frame.iter().all(|&b| b == 0));
}

#[test]
fn test_sample_then_clock_ordering() {
    let (sim, mut sensor) = sim_sensor(SimConfig {
        profile: LightProfile::Ramp {
            start: 0.1,
            end: 3.0,
        },
        ..SimConfig::default()
    });

    let mut frame = [0u8; FRAME_BYTES];
    sensor.read(&mut frame).unwrap();

    // 像素 k 必须落在偏移 2k：先采样后打时钟，没有错位
    let latched = sim.latched_pixels();
    let pixels = decode(&frame);
    assert_eq!(pixels.len(), PIXEL_COUNT);
    for (k, (&packed, &raw)) in pixels.iter().zip(latched.iter()).enumerate() {
        assert_eq!(packed, raw << 2, "pixel {}", k);
    }
    assert!(pixels.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_readout_trace_is_sample_then_clock() {
    let (sim, mut sensor) = sim_sensor(SimConfig {
        trace: true,
        ..SimConfig::default()
    });
    let pins = sensor.pins();
    sim.clear_trace();

    let mut frame = [0u8; FRAME_BYTES];
    sensor.read(&mut frame).unwrap();
    let trace = sim.trace();

    // 起始标记 4 + 传播 2160 + 延时 1 + 停止标记 4 + 读出 640 × 3
    assert_eq!(trace.len(), 4 + REGISTER_LENGTH * 2 + 1 + 4 + PIXEL_PAIRS * 3);

    let marker = [
        SimEvent::Level {
            pin: pins.si,
            level: Level::High,
        },
        SimEvent::Level {
            pin: pins.clock,
            level: Level::High,
        },
        SimEvent::Level {
            pin: pins.si,
            level: Level::Low,
        },
        SimEvent::Level {
            pin: pins.clock,
            level: Level::Low,
        },
    ];
    assert_eq!(&trace[..4], &marker);

    let delay_at = 4 + REGISTER_LENGTH * 2;
    assert_eq!(trace[delay_at], SimEvent::Delay { us: 500 });
    assert_eq!(&trace[delay_at + 1..delay_at + 5], &marker);

    let readout = &trace[delay_at + 5..];
    for (i, step) in readout.chunks_exact(3).enumerate() {
        assert_eq!(
            step[0],
            SimEvent::Sample {
                position: Some(i as u32)
            }
        );
        assert_eq!(
            step[1],
            SimEvent::Level {
                pin: pins.clock,
                level: Level::High
            }
        );
        assert_eq!(
            step[2],
            SimEvent::Level {
                pin: pins.clock,
                level: Level::Low
            }
        );
    }
}

#[test]
fn test_exposure_extends_capture_by_difference() {
    let (sim, mut sensor) = sim_sensor(SimConfig::default());
    let mut frame = [0u8; FRAME_BYTES];

    sensor.set_exposure_us(500);
    let before = sim.now_ns();
    sensor.read(&mut frame).unwrap();
    let short = sim.now_ns() - before;

    sensor.set_exposure_us(1_500);
    let before = sim.now_ns();
    sensor.read(&mut frame).unwrap();
    let long = sim.now_ns() - before;

    assert_eq!(long - short, 1_000_000);
}

#[test]
fn test_wall_clock_exposure_with_spin_delay() {
    let sim = SimulatedSensor::new(SimConfig::default());
    let mut sensor = SensorBuilder::new()
        .pins(sim.pins())
        .exposure_us(20_000)
        .build(sim.io(), sim.sampler(), SpinDelay::new())
        .unwrap();

    let mut frame = [0u8; FRAME_BYTES];
    let report = sensor.read(&mut frame).unwrap();
    assert!(report.elapsed >= Duration::from_micros(20_000));
}

#[test]
fn test_zero_exposure_still_latches() {
    let (sim, mut sensor) = sim_sensor(SimConfig::default());
    sensor.set_exposure_us(0);
    sim.reset_stats();

    let mut frame = [0u8; FRAME_BYTES];
    sensor.read(&mut frame).unwrap();

    assert_eq!(sim.stats().si_markers, 2);
    // 积分窗口只剩传播窗口本身：第 18 个时钟到停止标记
    assert_eq!(sim.last_integration_ns(), Some(1_063_000));
    assert!(sensor.phase().is_idle());
}

#[test]
fn test_longer_exposure_is_brighter() {
    let (_sim, mut sensor) = sim_sensor(SimConfig {
        profile: LightProfile::Flat(0.5),
        ..SimConfig::default()
    });
    let mut frame = [0u8; FRAME_BYTES];

    sensor.set_exposure_us(100);
    sensor.read(&mut frame).unwrap();
    let dim = decode(&frame);

    sensor.set_exposure_us(2_000);
    sensor.read(&mut frame).unwrap();
    let bright = decode(&frame);

    assert!(dim.iter().zip(bright.iter()).all(|(d, b)| d < b));
}

#[test]
fn test_repeated_reads_are_deterministic() {
    let (_sim, mut sensor) = sim_sensor(SimConfig {
        profile: LightProfile::Peak {
            center: 700,
            width: 50.0,
            height: 2.0,
            floor: 0.2,
        },
        ..SimConfig::default()
    });

    let mut first = [0u8; FRAME_BYTES];
    let mut second = [0u8; FRAME_BYTES];
    sensor.read(&mut first).unwrap();
    sensor.read(&mut second).unwrap();
    assert_eq!(first, second);
}

struct PulseProbe {
    sim: SimulatedSensor,
    seen_at: AtomicU64,
    calls: AtomicU64,
}

impl CaptureCallback for PulseProbe {
    fn on_integration_start(&self, _capture_seq: u64) {
        self.seen_at.store(self.sim.stats().clock_pulses, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_integration_start_hook_fires_at_pulse_18() {
    let sim = SimulatedSensor::new(SimConfig::default());
    let probe = Arc::new(PulseProbe {
        sim: sim.clone(),
        seen_at: AtomicU64::new(0),
        calls: AtomicU64::new(0),
    });
    let mut sensor = SensorBuilder::new()
        .pins(sim.pins())
        .hook(probe.clone())
        .build(sim.io(), sim.sampler(), sim.delay())
        .unwrap();

    // 初始化不触发
    assert_eq!(probe.calls.load(Ordering::Relaxed), 0);

    sim.reset_stats();
    let mut frame = [0u8; FRAME_BYTES];
    sensor.read(&mut frame).unwrap();

    // 起始标记 1 个时钟 + 传播窗口前 18 个时钟
    assert_eq!(probe.seen_at.load(Ordering::Relaxed), 19);
    assert_eq!(probe.calls.load(Ordering::Relaxed), 1);

    sensor.read(&mut frame).unwrap();
    assert_eq!(probe.calls.load(Ordering::Relaxed), 2);
}

#[test]
fn test_channel_hook_receives_events_in_order() {
    let sim = SimulatedSensor::new(SimConfig::default());
    let (hook, rx) = ChannelHook::new();
    let mut sensor = SensorBuilder::new()
        .pins(sim.pins())
        .build(sim.io(), sim.sampler(), sim.delay())
        .unwrap();
    sensor.add_hook(Arc::new(hook));

    let mut frame = [0u8; FRAME_BYTES];
    sensor.read(&mut frame).unwrap();
    sensor.read(&mut frame).unwrap();

    let events: Vec<CaptureEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], CaptureEvent::IntegrationStart { capture_seq: 0 });
    assert!(matches!(&events[1], CaptureEvent::FrameCaptured(r) if r.capture_seq == 0));
    assert_eq!(events[2], CaptureEvent::IntegrationStart { capture_seq: 1 });
    assert!(matches!(&events[3], CaptureEvent::FrameCaptured(r) if r.samples == 640));
}

#[test]
fn test_flush_can_be_repeated() {
    let (sim, mut sensor) = sim_sensor(SimConfig::default());
    sim.reset_stats();
    sensor.flush();

    assert_eq!(sim.stats().clock_pulses, 2165);
    assert_eq!(sim.stats().si_markers, 1);
    assert_eq!(sensor.metrics().snapshot().flushes_total, 2);
}

#[test]
fn test_independent_sensor_instances() {
    let (sim_a, mut sensor_a) = sim_sensor(SimConfig {
        profile: LightProfile::Flat(0.2),
        ..SimConfig::default()
    });
    let (sim_b, mut sensor_b) = sim_sensor(SimConfig {
        profile: LightProfile::Flat(1.0),
        ..SimConfig::default()
    });

    let mut frame_a = [0u8; FRAME_BYTES];
    let mut frame_b = [0u8; FRAME_BYTES];
    sensor_a.read(&mut frame_a).unwrap();
    sensor_b.read(&mut frame_b).unwrap();
    sensor_b.read(&mut frame_b).unwrap();

    assert_eq!(sensor_a.captures(), 1);
    assert_eq!(sensor_b.captures(), 2);
    assert_eq!(sim_a.stats().samples, 640);
    assert_eq!(sim_b.stats().samples, 1280);
    assert_ne!(frame_a, frame_b);
}
