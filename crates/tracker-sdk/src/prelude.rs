//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use tracker_sdk::prelude::*;
//! ```

// 会话
pub use crate::driver::{PoseReader, PoseSession, SessionBuilder, SessionConfig, SessionState};
// 位姿
pub use crate::driver::{Pose, TrackingResult};
pub use crate::protocol::{OrientationPolicy, Quaternion};

// 钩子
pub use crate::driver::{PoseCallback, PoseStreamHook};

// 设备适配
pub use crate::driver::{DriverHost, Settings, TrackedDevice, TrackerConfig, TrackerDevice};

// 错误类型
pub use crate::driver::{ConfigError, DeviceError, SessionError};
pub use crate::protocol::ProtocolError;
