//! # 统计工具
//!
//! 单帧像素统计与多帧平均

use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// 单帧像素统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStatistics {
    /// 最小像素值
    pub min: u16,

    /// 最大像素值
    pub max: u16,

    /// 平均值
    pub mean: f64,

    /// 标准差（总体）
    pub std_dev: f64,

    /// 最大值所在像素（多个相同最大值时取第一个）
    pub peak_pixel: usize,

    /// 达到饱和阈值的像素数量
    pub saturated_pixels: usize,

    /// 像素数量
    pub pixel_count: usize,
}

impl FrameStatistics {
    /// 计算统计量
    ///
    /// `saturation` 是饱和阈值（含），像素值 `>= saturation` 计为饱和。
    pub fn calculate(pixels: &[u16], saturation: u16) -> Self {
        if pixels.is_empty() {
            return Self {
                min: 0,
                max: 0,
                mean: 0.0,
                std_dev: 0.0,
                peak_pixel: 0,
                saturated_pixels: 0,
                pixel_count: 0,
            };
        }

        let sum: u64 = pixels.iter().map(|&v| v as u64).sum();
        let mean = sum as f64 / pixels.len() as f64;

        let min = pixels.iter().copied().min().unwrap_or(0);
        let mut peak_pixel = 0;
        let mut max = pixels[0];
        for (index, &value) in pixels.iter().enumerate().skip(1) {
            if value > max {
                max = value;
                peak_pixel = index;
            }
        }

        let variance = pixels
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / pixels.len() as f64;

        Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            peak_pixel,
            saturated_pixels: pixels.iter().filter(|&&v| v >= saturation).count(),
            pixel_count: pixels.len(),
        }
    }

    /// 计算一帧的统计量
    pub fn of_frame(frame: &Frame, saturation: u16) -> Self {
        Self::calculate(frame.pixels(), saturation)
    }

    /// 动态范围（max - min）
    pub fn dynamic_range(&self) -> u16 {
        self.max - self.min
    }

    /// 是否有像素饱和
    pub fn is_saturated(&self) -> bool {
        self.saturated_pixels > 0
    }
}

/// 以背景（最小值）为基线的强度加权质心
///
/// 返回亚像素精度的位置；全平坦的帧返回 `None`。
pub fn centroid(pixels: &[u16]) -> Option<f64> {
    let floor = pixels.iter().copied().min()?;

    let mut weight_sum = 0.0;
    let mut moment = 0.0;
    for (index, &value) in pixels.iter().enumerate() {
        let weight = (value - floor) as f64;
        weight_sum += weight;
        moment += weight * index as f64;
    }

    if weight_sum == 0.0 {
        return None;
    }
    Some(moment / weight_sum)
}

/// 多帧逐像素平均（降噪）
///
/// 帧长度不一致时以最短帧为准。
pub fn average_frames(frames: &[Frame]) -> Vec<f64> {
    let Some(len) = frames.iter().map(Frame::len).min() else {
        return Vec::new();
    };

    let mut sums = vec![0.0; len];
    for frame in frames {
        for (sum, &value) in sums.iter_mut().zip(frame.pixels()) {
            *sum += value as f64;
        }
    }

    let count = frames.len() as f64;
    sums.iter_mut().for_each(|sum| *sum /= count);
    sums
}
