//! 钩子系统（Hook System）
//!
//! 采集过程中的扩展点：
//!
//! - **积分开始**：传播窗口第 18 个时钟处，光电二极管重新开始积分，
//!   外部同步触发（闪光灯、激光等）可以挂在这里
//! - **帧完成**：读出循环结束后
//!
//! 回调在驱动线程中同步执行，位于时序关键路径上，必须非阻塞。
//! 推荐用 [`ChannelHook`] 把事件转发到其他线程处理。
//!
//! # 使用示例
//!
//! ```rust
//! use tsl_driver::hooks::{CaptureCallback, ChannelHook, HookManager};
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (hook, rx) = ChannelHook::new();
//! hooks.add_callback(Arc::new(hook));
//!
//! hooks.trigger_integration_start(7);
//! assert!(rx.try_recv().is_ok());
//! ```

use crate::sensor::CaptureReport;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 采集回调 Trait
///
/// # 性能要求
///
/// - 积分开始回调位于 1080 个时钟的传播窗口内，耗时会直接拉长该帧的积分时间
/// - 禁止阻塞操作（Mutex、I/O）
pub trait CaptureCallback: Send + Sync {
    /// 光电二极管开始积分时调用（每帧一次）
    ///
    /// - `capture_seq`: 帧序号（从 0 开始）
    fn on_integration_start(&self, capture_seq: u64);

    /// 一帧读出完成后调用（可选）
    fn on_frame_captured(&self, report: &CaptureReport) {
        let _ = report;
    }
}

/// 钩子管理器
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn CaptureCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn CaptureCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub fn trigger_integration_start(&self, capture_seq: u64) {
        for callback in self.callbacks.iter() {
            callback.on_integration_start(capture_seq);
        }
    }

    pub fn trigger_frame_captured(&self, report: &CaptureReport) {
        for callback in self.callbacks.iter() {
            callback.on_frame_captured(report);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// 采集事件
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    IntegrationStart { capture_seq: u64 },
    FrameCaptured(CaptureReport),
}

/// 基于 Channel 的异步钩子
///
/// - 有界队列，队列满时丢弃事件而非阻塞
/// - `dropped_events` 计数器用于监控丢弃
pub struct ChannelHook {
    tx: Sender<CaptureEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ChannelHook {
    /// 默认队列容量（约 1000 帧的事件）
    pub const DEFAULT_CAPACITY: usize = 2048;

    #[must_use]
    pub fn new() -> (Self, Receiver<CaptureEvent>) {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<CaptureEvent>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            dropped_events: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 丢弃计数器（可 clone 后在其他线程读取）
    pub fn dropped_events(&self) -> &Arc<AtomicU64> {
        &self.dropped_events
    }

    fn push(&self, event: CaptureEvent) {
        if self.tx.try_send(event).is_err() {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl CaptureCallback for ChannelHook {
    fn on_integration_start(&self, capture_seq: u64) {
        self.push(CaptureEvent::IntegrationStart { capture_seq });
    }

    fn on_frame_captured(&self, report: &CaptureReport) {
        self.push(CaptureEvent::FrameCaptured(report.clone()));
    }
}
