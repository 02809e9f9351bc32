//! # 帧解码
//!
//! 把驱动填充的 2560 字节缓冲区还原为 1280 个 16 位像素值。
//! 缓冲区前半部分来自 AO1（像素 0..640），后半部分来自 AO2（像素 640..1280），
//! 因此解码后的顺序就是物理像素顺序。

use crate::error::ToolsError;
use std::io::{self, Write};
use tsl_driver::frame::{BYTES_PER_PIXEL, FRAME_BYTES, PIXEL_COUNT, PIXEL_PAIRS, SAMPLE_SHIFT};

/// 模拟输出通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// AO1：像素 0..640
    Ao1,
    /// AO2：像素 640..1280
    Ao2,
}

/// 解码后的一帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 16 位量程的像素值（原始 ADC 值左移 2 位）
    pixels: Vec<u16>,
}

impl Frame {
    /// 从驱动输出的缓冲区解码
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ToolsError> {
        if bytes.len() != FRAME_BYTES {
            return Err(ToolsError::InvalidFrame {
                expected: FRAME_BYTES,
                actual: bytes.len(),
            });
        }

        let pixels = bytes
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { pixels })
    }

    /// 从一段连续录制的字节流中解码多帧（长度必须是帧大小的整数倍）
    pub fn split_stream(bytes: &[u8]) -> Result<Vec<Self>, ToolsError> {
        if bytes.len() % FRAME_BYTES != 0 {
            return Err(ToolsError::InvalidFrame {
                expected: FRAME_BYTES * (bytes.len() / FRAME_BYTES + 1),
                actual: bytes.len(),
            });
        }
        bytes.chunks_exact(FRAME_BYTES).map(Self::from_bytes).collect()
    }

    /// 16 位量程像素值
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// 原始 ADC 读数（撤销打包时的左移）
    pub fn raw_pixels(&self) -> Vec<u16> {
        self.pixels.iter().map(|&v| v >> SAMPLE_SHIFT).collect()
    }

    /// 单个通道的 640 个像素
    pub fn channel(&self, channel: Channel) -> &[u16] {
        match channel {
            Channel::Ao1 => &self.pixels[..PIXEL_PAIRS],
            Channel::Ao2 => &self.pixels[PIXEL_PAIRS..],
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// 重新编码为驱动的缓冲区格式
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PIXEL_COUNT * BYTES_PER_PIXEL);
        for value in &self.pixels {
            bytes.extend_from_slice(&value.to_be_bytes());
        }
        bytes
    }
}

/// 逐帧写出 CSV（`frame,pixel,value`，每个像素一行）
///
/// 表头在创建时写出，帧序号从 0 递增，不需要把所有帧留在内存里。
pub struct CsvWriter<W: Write> {
    writer: W,
    frames: usize,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "frame,pixel,value")?;
        Ok(Self { writer, frames: 0 })
    }

    pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        for (pixel, value) in frame.pixels.iter().enumerate() {
            writeln!(self.writer, "{},{},{}", self.frames, pixel, value)?;
        }
        self.frames += 1;
        Ok(())
    }

    /// 已写出的帧数
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// 刷新并取回底层 writer
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// 以 CSV 写出多帧
pub fn write_csv<W: Write>(frames: &[Frame], writer: W) -> io::Result<()> {
    let mut csv = CsvWriter::new(writer)?;
    for frame in frames {
        csv.write_frame(frame)?;
    }
    csv.finish().map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsl_driver::frame::{ch1_offset, ch2_offset, pack_sample};

    fn buffer_with(ch1: impl Fn(usize) -> u16, ch2: impl Fn(usize) -> u16) -> Vec<u8> {
        let mut buffer = vec![0u8; FRAME_BYTES];
        for i in 0..PIXEL_PAIRS {
            buffer[ch1_offset(i)..ch1_offset(i) + 2].copy_from_slice(&pack_sample(ch1(i)));
            buffer[ch2_offset(i)..ch2_offset(i) + 2].copy_from_slice(&pack_sample(ch2(i)));
        }
        buffer
    }

    #[test]
    fn test_decode_orders_pixels_physically() {
        let bytes = buffer_with(|i| i as u16, |i| (i + PIXEL_PAIRS) as u16);
        let frame = Frame::from_bytes(&bytes).unwrap();

        assert_eq!(frame.len(), PIXEL_COUNT);
        let raw = frame.raw_pixels();
        assert!(raw.iter().enumerate().all(|(k, &v)| v as usize == k));
        assert_eq!(frame.channel(Channel::Ao1)[5], 5 << 2);
        assert_eq!(frame.channel(Channel::Ao2)[5], (645 << 2) as u16);
        assert_eq!(frame.to_bytes(), bytes);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = Frame::from_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            ToolsError::InvalidFrame {
                expected: 2560,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_split_stream() {
        let mut stream = buffer_with(|_| 1, |_| 2);
        stream.extend(buffer_with(|_| 3, |_| 4));

        let frames = Frame::split_stream(&stream).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].raw_pixels()[0], 3);

        stream.pop();
        assert!(Frame::split_stream(&stream).is_err());
    }

    #[test]
    fn test_write_csv() {
        let first = Frame::from_bytes(&buffer_with(|_| 1, |_| 0)).unwrap();
        let second = Frame::from_bytes(&buffer_with(|_| 2, |_| 3)).unwrap();
        let mut out = Vec::new();
        write_csv(&[first, second], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("frame,pixel,value"));
        assert_eq!(lines.next(), Some("0,0,4"));
        assert_eq!(text.lines().count(), 2 * PIXEL_COUNT + 1);
        assert!(text.contains("\n0,1279,0\n1,0,8\n"));
        assert!(text.ends_with("1,1279,12\n"));
    }

    #[test]
    fn test_csv_writer_streams_frames() {
        let frame = Frame::from_bytes(&buffer_with(|_| 5, |_| 6)).unwrap();

        let mut csv = CsvWriter::new(Vec::new()).unwrap();
        assert_eq!(csv.frames(), 0);
        for _ in 0..3 {
            csv.write_frame(&frame).unwrap();
        }
        assert_eq!(csv.frames(), 3);

        let text = String::from_utf8(csv.finish().unwrap()).unwrap();
        assert!(text.starts_with("frame,pixel,value\n0,0,20\n"));
        assert_eq!(text.lines().count(), 3 * PIXEL_COUNT + 1);
        assert!(text.ends_with("2,1279,24\n"));
    }

    #[test]
    fn test_csv_writer_header_only() {
        let out = CsvWriter::new(Vec::new()).unwrap().finish().unwrap();
        assert_eq!(out, b"frame,pixel,value\n");
    }
}
