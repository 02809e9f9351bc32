//! 帧布局与时序常量
//!
//! TSL1410R 为 1280 像素，分两段并行输出（AO1：像素 0..640，AO2：像素 640..1280）。
//! 每个像素打包为 2 字节大端，AO1 占缓冲区前半部分，AO2 占后半部分，
//! 因此缓冲区字节顺序与物理像素顺序一致。

/// 初始化清空寄存器时的时钟数（寄存器长度 + 保护余量）
pub const FLUSH_CLOCKS: usize = 1082;

/// 移位寄存器长度（传播窗口的时钟数）
pub const REGISTER_LENGTH: usize = 1080;

/// 每帧读出的像素对数（= 同步采样次数 = 读出时钟数）
pub const PIXEL_PAIRS: usize = 640;

/// 总像素数
pub const PIXEL_COUNT: usize = 2 * PIXEL_PAIRS;

pub const BYTES_PER_PIXEL: usize = 2;

/// 帧缓冲区长度（字节）
pub const FRAME_BYTES: usize = PIXEL_COUNT * BYTES_PER_PIXEL;

/// 原始采样左移位数（把低位宽 ADC 读数放大到 16 位量程）
pub const SAMPLE_SHIFT: u32 = 2;

/// 传播窗口中光电二极管重新开始积分的时钟序号
pub const INTEGRATION_START_PULSE: usize = 18;

/// 默认额外曝光时间（微秒）
pub const DEFAULT_EXPOSURE_US: u32 = 500;

/// 单帧时钟数：起始标记 + 传播窗口 + 停止标记 + 读出
pub const CLOCKS_PER_CAPTURE: usize = 1 + REGISTER_LENGTH + 1 + PIXEL_PAIRS;

/// 初始化时钟数：清空 + 标记 + 再清空
pub const CLOCKS_PER_FLUSH: usize = FLUSH_CLOCKS + 1 + FLUSH_CLOCKS;

/// 打包一个原始采样
///
/// 左移 [`SAMPLE_SHIFT`] 位后按大端拆成两个字节；超出 16 位的高位被丢弃。
#[inline]
pub fn pack_sample(raw: u16) -> [u8; 2] {
    (raw << SAMPLE_SHIFT).to_be_bytes()
}

/// 通道 1 第 `i` 个像素的高字节偏移
#[inline]
pub const fn ch1_offset(i: usize) -> usize {
    i * BYTES_PER_PIXEL
}

/// 通道 2 第 `i` 个像素的高字节偏移
#[inline]
pub const fn ch2_offset(i: usize) -> usize {
    (i + PIXEL_PAIRS) * BYTES_PER_PIXEL
}
