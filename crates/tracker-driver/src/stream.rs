//! 位姿流订阅钩子
//!
//! 基于有界 Channel 的推送式订阅：回调中只做 `try_send`，
//! 队列满时丢弃并计数，绝不阻塞接收线程。
//!
//! # 使用示例
//!
//! ```rust
//! use tracker_driver::stream::PoseStreamHook;
//! use tracker_driver::hooks::PoseCallback;
//! use std::sync::Arc;
//!
//! let (hook, rx) = PoseStreamHook::new();
//! let dropped = hook.dropped_poses().clone();
//! let callback = Arc::new(hook) as Arc<dyn PoseCallback>;
//!
//! std::thread::spawn(move || {
//!     while let Ok(pose) = rx.recv() {
//!         // 处理位姿...
//!         let _ = pose;
//!     }
//! });
//!
//! println!("丢了 {} 个位姿", dropped.load(std::sync::atomic::Ordering::Relaxed));
//! ```

use crate::hooks::PoseCallback;
use crate::state::Pose;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 默认队列容量（约 10 秒 @ 100Hz）
pub const DEFAULT_STREAM_CAPACITY: usize = 1024;

/// 位姿流订阅钩子
pub struct PoseStreamHook {
    tx: Sender<Pose>,
    dropped_poses: Arc<AtomicU64>,
    delivered_poses: Arc<AtomicU64>,
}

impl PoseStreamHook {
    /// 创建默认容量的订阅钩子
    #[must_use]
    pub fn new() -> (Self, Receiver<Pose>) {
        Self::with_capacity(DEFAULT_STREAM_CAPACITY)
    }

    /// 创建指定容量的订阅钩子
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<Pose>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            dropped_poses: Arc::new(AtomicU64::new(0)),
            delivered_poses: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 丢弃计数器（队列满或接收端已关闭）
    pub fn dropped_poses(&self) -> &Arc<AtomicU64> {
        &self.dropped_poses
    }

    /// 成功投递计数器
    pub fn delivered_poses(&self) -> &Arc<AtomicU64> {
        &self.delivered_poses
    }
}

impl PoseCallback for PoseStreamHook {
    fn on_pose_updated(&self, pose: &Pose) {
        match self.tx.try_send(*pose) {
            Ok(()) => {
                self.delivered_poses.fetch_add(1, Ordering::Relaxed);
            },
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped_poses.fetch_add(1, Ordering::Relaxed);
            },
        }
    }
}
