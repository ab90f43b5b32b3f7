//! Tracker SDK - UDP IMU 姿态追踪 SDK
//!
//! 把外部惯性传感器通过 UDP 发送的姿态数据转换为追踪运行时可轮询的"当前位姿"。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 28 字节定长数据包的编解码、四元数、坐标系转换
//! - **驱动层** (`driver`): 位姿会话、接收线程、插槽、钩子、配置、设备适配
//! - **日志** (`logging`): 订阅器初始化
//!
//! # 快速开始
//!
//! ```no_run
//! use tracker_sdk::prelude::*;
//!
//! tracker_sdk::logging::init();
//!
//! let mut session = PoseSession::new();
//! session.start(8080)?;
//!
//! let pose = session.current_pose();
//! println!("{:?}", pose.orientation);
//!
//! session.stop();
//! # Ok::<(), SessionError>(())
//! ```

pub mod logging;
pub mod prelude;

pub use tracker_driver as driver;
pub use tracker_protocol as protocol;

// 协议层
pub use protocol::{DecodeError, OrientationPolicy, ProtocolError, Quaternion, WireSample, to_consumer_frame};

// 驱动层
pub use driver::{
    ConfigError, DeviceError, Pose, PoseReader, PoseSession, SessionBuilder, SessionConfig, SessionError,
    SessionState, TrackerConfig, TrackerDevice,
};
