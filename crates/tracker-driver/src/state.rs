//! 会话状态与共享位姿插槽
//!
//! - `SessionState` / `AtomicSessionState`：会话生命周期（跨线程可读）
//! - `Pose`：对外发布的位姿快照
//! - `PoseSlot`：唯一的共享可变资源，由一把互斥锁保护
//! - `PoseContext`：接收线程与调用方共享的上下文

use crate::heartbeat::ConnectionMonitor;
use crate::hooks::HookManager;
use crate::metrics::SessionMetrics;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tracker_protocol::Quaternion;

/// 默认固定位置：上方 1 个单位（约腰部高度）
pub const DEFAULT_POSITION: [f32; 3] = [0.0, 1.0, 0.0];

/// 会话生命周期状态
///
/// ```text
/// Idle ──start()──▶ Running ──stop()──▶ Stopping ──worker exit──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SessionState {
    /// 无 Socket、无线程（初始状态）
    #[default]
    Idle = 0,
    /// 接收线程运行中
    Running = 1,
    /// 已请求停止，等待接收线程退出
    Stopping = 2,
}

impl SessionState {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Idle。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Idle,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

/// 会话状态（原子版本，用于线程间共享）
#[derive(Debug)]
pub struct AtomicSessionState {
    inner: AtomicU8,
}

impl AtomicSessionState {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    pub fn get(&self, ordering: Ordering) -> SessionState {
        SessionState::from_u8(self.inner.load(ordering))
    }

    pub fn set(&self, state: SessionState, ordering: Ordering) {
        self.inner.store(state.as_u8(), ordering);
    }
}

impl Default for AtomicSessionState {
    fn default() -> Self {
        Self::new(SessionState::Idle)
    }
}

/// 追踪结果
///
/// 本系统没有位置感知能力，也不做标定流程，因此始终报告 `RunningOk`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum TrackingResult {
    #[default]
    RunningOk,
}

/// 对外发布的位姿快照（消费端坐标系，Y-Up）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// 姿态四元数
    pub orientation: Quaternion,
    /// 固定位置（配置的高度偏移，不来自传感器）
    pub position: [f32; 3],
    /// 最近一次样本的原始加速度（传感器坐标系，仅供参考）
    pub raw_acceleration: [f32; 3],
    pub pose_is_valid: bool,
    pub device_is_connected: bool,
    pub result: TrackingResult,
    /// 已应用到插槽的样本数（0 表示尚未收到数据）
    pub sample_count: u64,
}

impl Pose {
    /// 单位姿态 + 指定位置
    pub fn identity_at(position: [f32; 3]) -> Self {
        Self {
            orientation: Quaternion::IDENTITY,
            position,
            raw_acceleration: [0.0; 3],
            pose_is_valid: true,
            device_is_connected: true,
            result: TrackingResult::RunningOk,
            sample_count: 0,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity_at(DEFAULT_POSITION)
    }
}

/// 插槽内的可变数据（锁内只做字段拷贝）
#[derive(Debug, Clone, Copy)]
struct SlotData {
    orientation: Quaternion,
    acceleration: [f32; 3],
    sample_count: u64,
}

/// 最新位姿插槽
///
/// 写入方只有接收线程；读取方可以是任意线程。临界区只包含一次字段拷贝，
/// 读者不会观察到新旧分量混合的四元数。
#[derive(Debug)]
pub struct PoseSlot {
    data: Mutex<SlotData>,
    position: [f32; 3],
}

impl PoseSlot {
    /// 创建插槽，初始姿态为单位四元数
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            data: Mutex::new(SlotData {
                orientation: Quaternion::IDENTITY,
                acceleration: [0.0; 3],
                sample_count: 0,
            }),
            position,
        }
    }

    /// 覆盖写入最新样本，返回写入后的位姿快照
    pub fn store(&self, orientation: Quaternion, acceleration: [f32; 3]) -> Pose {
        let sample_count = {
            let mut data = self.data.lock();
            data.orientation = orientation;
            data.acceleration = acceleration;
            data.sample_count += 1;
            data.sample_count
        };

        Pose {
            orientation,
            raw_acceleration: acceleration,
            sample_count,
            ..Pose::identity_at(self.position)
        }
    }

    /// 读取快照（拷贝，不修改插槽）
    pub fn snapshot(&self) -> Pose {
        let data = *self.data.lock();
        Pose {
            orientation: data.orientation,
            raw_acceleration: data.acceleration,
            sample_count: data.sample_count,
            ..Pose::identity_at(self.position)
        }
    }

    /// 固定位置
    pub fn position(&self) -> [f32; 3] {
        self.position
    }
}

impl Default for PoseSlot {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION)
    }
}

/// 共享状态上下文
///
/// 接收线程持有一份 `Arc<PoseContext>`，会话与读者持有其余副本。
pub struct PoseContext {
    /// 最新位姿插槽
    pub pose: PoseSlot,
    /// 位姿更新回调
    pub hooks: RwLock<HookManager>,
    /// 接收链路计数器
    pub metrics: SessionMetrics,
    /// 样本流活跃度监控
    pub connection_monitor: ConnectionMonitor,
}

impl PoseContext {
    pub fn new(position: [f32; 3]) -> Self {
        Self::with_stream_timeout(position, ConnectionMonitor::DEFAULT_TIMEOUT)
    }

    pub fn with_stream_timeout(position: [f32; 3], stream_timeout: Duration) -> Self {
        Self {
            pose: PoseSlot::new(position),
            hooks: RwLock::new(HookManager::new()),
            metrics: SessionMetrics::new(),
            connection_monitor: ConnectionMonitor::new(stream_timeout),
        }
    }
}

impl Default for PoseContext {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION)
    }
}
