//! 追踪设备适配层
//!
//! 追踪运行时以"设备"为单位管理生命周期：激活、停用、待机、查询位姿。
//! [`TrackedDevice`] 描述这组能力，[`TrackerDevice`] 把它们委托给 [`PoseSession`]：
//!
//! - `activate` → `session.start(port)`
//! - `deactivate` → `session.stop()`
//! - `get_pose` → `session.current_pose()`
//!
//! 每个被接收线程应用的样本都会通过 [`DriverHost`] 通知运行时一次。

use crate::builder::SessionConfig;
use crate::config::{DEFAULT_MODEL_NUMBER, MODEL_NUMBER_KEY, SETTINGS_SECTION, Settings, TrackerConfig};
use crate::error::{ConfigError, DeviceError};
use crate::hooks::PoseCallback;
use crate::session::PoseSession;
use crate::state::Pose;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{info, trace, warn};

/// 无效设备索引（未激活）
pub const INVALID_DEVICE_INDEX: u32 = u32::MAX;

/// 宿主运行时回调接口
pub trait DriverHost: Send + Sync {
    /// 通知运行时某设备的位姿已更新
    fn tracked_device_pose_updated(&self, device_index: u32, pose: &Pose);
}

/// 追踪设备能力
pub trait TrackedDevice {
    /// 激活设备，`device_index` 由运行时分配
    fn activate(&mut self, device_index: u32) -> Result<(), DeviceError>;

    /// 停用设备；返回时接收线程已退出
    fn deactivate(&mut self);

    /// 进入待机（仅记录日志）
    fn enter_standby(&mut self);

    /// 当前位姿
    fn get_pose(&self) -> Pose;

    /// 调试请求；未知请求返回空字符串
    fn debug_request(&self, request: &str) -> String;

    /// 序列号（型号 + 实例编号）
    fn serial_number(&self) -> &str;
}

/// 把位姿更新转发给宿主
struct HostNotifier {
    host: Arc<dyn DriverHost>,
    device_index: Arc<AtomicU32>,
}

impl PoseCallback for HostNotifier {
    fn on_pose_updated(&self, pose: &Pose) {
        let index = self.device_index.load(Ordering::Acquire);
        if index != INVALID_DEVICE_INDEX {
            self.host.tracked_device_pose_updated(index, pose);
        }
    }
}

/// 单个 IMU 追踪设备
pub struct TrackerDevice {
    tracker_id: u32,
    model_number: String,
    serial_number: String,
    port: u16,
    device_index: Arc<AtomicU32>,
    session: PoseSession,
}

impl TrackerDevice {
    /// 创建设备
    ///
    /// 型号从宿主设置 `driver_simpletrackers/mytracker_model_number` 读取，
    /// 缺失时使用 `simpletracker`。
    pub fn new(
        tracker_id: u32,
        settings: &dyn Settings,
        host: Arc<dyn DriverHost>,
        session_config: SessionConfig,
        port: u16,
    ) -> Self {
        let model_number = settings
            .get_string(SETTINGS_SECTION, MODEL_NUMBER_KEY)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                warn!("No model number in settings, using {}", DEFAULT_MODEL_NUMBER);
                DEFAULT_MODEL_NUMBER.to_string()
            });
        let serial_number = format!("{}{}", model_number, tracker_id);

        info!("Tracker model number: {}", model_number);
        info!("Tracker serial number: {}", serial_number);

        let device_index = Arc::new(AtomicU32::new(INVALID_DEVICE_INDEX));
        let session = PoseSession::with_config(session_config);
        session.add_callback(Arc::new(HostNotifier {
            host,
            device_index: Arc::clone(&device_index),
        }));

        Self {
            tracker_id,
            model_number,
            serial_number,
            port,
            device_index,
            session,
        }
    }

    /// 从配置文件内容创建设备（校验后使用其网络与位姿设置）
    pub fn from_config(
        tracker_id: u32,
        config: &TrackerConfig,
        host: Arc<dyn DriverHost>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            tracker_id,
            config,
            host,
            config.session_config(),
            config.network.port,
        ))
    }

    pub fn tracker_id(&self) -> u32 {
        self.tracker_id
    }

    pub fn model_number(&self) -> &str {
        &self.model_number
    }

    /// 运行时分配的设备索引（未激活时为 `None`）
    pub fn device_index(&self) -> Option<u32> {
        match self.device_index.load(Ordering::Acquire) {
            INVALID_DEVICE_INDEX => None,
            index => Some(index),
        }
    }

    pub fn is_active(&self) -> bool {
        self.device_index().is_some()
    }

    /// 底层会话（只读）
    pub fn session(&self) -> &PoseSession {
        &self.session
    }

    /// 每帧调用一次
    pub fn run_frame(&self) {
        trace!(serial = %self.serial_number, "heartbeat");
    }

    fn status_report(&self) -> String {
        let metrics = self.session.metrics();
        let pose = self.session.current_pose();
        format!(
            "serial={} state={:?} streaming={} samples={} rejected={} errors={} orientation=[{}, {}, {}, {}]",
            self.serial_number,
            self.session.state(),
            self.session.is_streaming(),
            metrics.samples_applied,
            metrics.datagrams_rejected,
            metrics.receive_errors,
            pose.orientation.w,
            pose.orientation.x,
            pose.orientation.y,
            pose.orientation.z,
        )
    }
}

impl TrackedDevice for TrackerDevice {
    fn activate(&mut self, device_index: u32) -> Result<(), DeviceError> {
        self.device_index.store(device_index, Ordering::Release);

        if let Err(e) = self.session.start(self.port) {
            self.device_index.store(INVALID_DEVICE_INDEX, Ordering::Release);
            return Err(e.into());
        }

        info!(device_index, serial = %self.serial_number, "Tracker activated");
        Ok(())
    }

    fn deactivate(&mut self) {
        self.session.stop();
        self.device_index.store(INVALID_DEVICE_INDEX, Ordering::Release);
        info!(serial = %self.serial_number, "Tracker deactivated");
    }

    fn enter_standby(&mut self) {
        info!(serial = %self.serial_number, "Tracker has been put into standby");
    }

    fn get_pose(&self) -> Pose {
        self.session.current_pose()
    }

    fn debug_request(&self, request: &str) -> String {
        match request.trim() {
            "status" => self.status_report(),
            _ => String::new(),
        }
    }

    fn serial_number(&self) -> &str {
        &self.serial_number
    }
}

impl std::fmt::Debug for TrackerDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerDevice")
            .field("serial_number", &self.serial_number)
            .field("device_index", &self.device_index())
            .field("port", &self.port)
            .finish()
    }
}
