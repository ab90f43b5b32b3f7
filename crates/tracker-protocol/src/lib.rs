//! # Tracker Protocol
//!
//! IMU 追踪器 UDP 协议定义（无 IO、无线程依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量定义
//! - `sample`: 线上数据包 `WireSample` 的编解码
//! - `quaternion`: 四元数类型
//! - `transform`: 传感器坐标系 → 消费端坐标系转换
//!
//! ## 字节序
//!
//! 协议使用小端字节序（Little-Endian）的 IEEE-754 单精度浮点数，
//! 与常见的 MCU 端（ESP32 等）内存布局一致。

pub mod constants;
pub mod quaternion;
pub mod sample;
pub mod transform;

// 重新导出常用类型
pub use constants::*;
pub use quaternion::Quaternion;
pub use sample::WireSample;
pub use transform::{OrientationPolicy, to_consumer_frame};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid sample size: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// 解码错误（`ProtocolError` 的别名）
pub type DecodeError = ProtocolError;

/// 字节序转换工具函数
///
/// 小端字节序转 f32
pub fn bytes_to_f32_le(bytes: [u8; 4]) -> f32 {
    f32::from_le_bytes(bytes)
}

/// f32 转小端字节序
pub fn f32_to_bytes_le(value: f32) -> [u8; 4] {
    value.to_le_bytes()
}
