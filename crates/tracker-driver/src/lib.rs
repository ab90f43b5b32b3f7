//! 驱动层模块
//!
//! 本模块提供 IMU 追踪器的位姿会话功能，包括：
//! - UDP 接收线程管理（单个后台线程，waker 唤醒式停止）
//! - 最新位姿插槽（互斥锁保护，读者不会看到半写入的四元数）
//! - 钩子系统：位姿更新通知、推送式订阅
//! - 接收链路指标与样本流监控
//! - TOML 配置与宿主设置查询
//! - 追踪设备适配层（激活/停用/查询位姿）
//!
//! # 使用场景
//!
//! 直接使用 [`PoseSession`] 读取位姿；需要对接追踪运行时的场景使用
//! [`TrackerDevice`]。

mod builder;
pub mod config;
pub mod device;
mod error;
pub mod heartbeat;
pub mod hooks;
pub mod metrics;
pub mod pipeline;
mod session;
pub mod state;
pub mod stream;
pub mod transport;

pub use builder::{SessionBuilder, SessionConfig};
pub use config::{Settings, TrackerConfig};
pub use device::{DriverHost, INVALID_DEVICE_INDEX, TrackedDevice, TrackerDevice};
pub use error::{ConfigError, DeviceError, SessionError};
pub use heartbeat::ConnectionMonitor;
pub use hooks::{HookManager, PoseCallback};
pub use metrics::{MetricsSnapshot, SessionMetrics};
pub use pipeline::{PipelineConfig, apply_datagram, rx_loop};
pub use session::{PoseReader, PoseSession};
pub use state::*;
pub use stream::PoseStreamHook;
