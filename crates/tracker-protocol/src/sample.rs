//! 线上数据包（WireSample）
//!
//! 传感器通过 UDP 发送的定长数据包，布局如下（无填充，小端 f32）：
//!
//! ```text
//! ┌──────┬──────┬──────┬──────┬──────┬──────┬──────┐
//! │  w   │  x   │  y   │  z   │  ax  │  ay  │  az  │
//! │ 0..4 │ 4..8 │ 8..12│12..16│16..20│20..24│24..28│
//! └──────┴──────┴──────┴──────┴──────┴──────┴──────┘
//! ```
//!
//! 只有长度恰好为 28 字节的数据报才是合法样本。

use crate::constants::{WIRE_SAMPLE_SIZE, offsets};
use crate::quaternion::Quaternion;
use crate::{ProtocolError, bytes_to_f32_le, f32_to_bytes_le};

/// 传感器原始样本（传感器坐标系）
///
/// # 示例
///
/// ```rust
/// use tracker_protocol::{WireSample, WIRE_SAMPLE_SIZE};
///
/// let sample = WireSample::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 9.81);
/// let bytes = sample.encode();
/// assert_eq!(bytes.len(), WIRE_SAMPLE_SIZE);
///
/// let decoded = WireSample::decode(&bytes).unwrap();
/// assert_eq!(decoded, sample);
///
/// // 长度不符的数据报被拒绝
/// assert!(WireSample::decode(&bytes[..10]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireSample {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// 原始线加速度（传感器坐标系），仅供参考
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
}

impl WireSample {
    pub const fn new(w: f32, x: f32, y: f32, z: f32, ax: f32, ay: f32, az: f32) -> Self {
        Self {
            w,
            x,
            y,
            z,
            ax,
            ay,
            az,
        }
    }

    /// 由姿态四元数和加速度构造
    pub const fn from_parts(orientation: Quaternion, acceleration: [f32; 3]) -> Self {
        Self::new(
            orientation.w,
            orientation.x,
            orientation.y,
            orientation.z,
            acceleration[0],
            acceleration[1],
            acceleration[2],
        )
    }

    /// 解码数据报
    ///
    /// 纯函数，无堆分配。长度不等于 [`WIRE_SAMPLE_SIZE`] 时返回
    /// `ProtocolError::SizeMismatch`，不会越界读取。
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let bytes: &[u8; WIRE_SAMPLE_SIZE] =
            bytes.try_into().map_err(|_| ProtocolError::SizeMismatch {
                expected: WIRE_SAMPLE_SIZE,
                actual: bytes.len(),
            })?;

        Ok(Self {
            w: read_f32(bytes, offsets::W),
            x: read_f32(bytes, offsets::X),
            y: read_f32(bytes, offsets::Y),
            z: read_f32(bytes, offsets::Z),
            ax: read_f32(bytes, offsets::AX),
            ay: read_f32(bytes, offsets::AY),
            az: read_f32(bytes, offsets::AZ),
        })
    }

    /// 编码为线上字节
    pub fn encode(&self) -> [u8; WIRE_SAMPLE_SIZE] {
        let mut bytes = [0u8; WIRE_SAMPLE_SIZE];
        write_f32(&mut bytes, offsets::W, self.w);
        write_f32(&mut bytes, offsets::X, self.x);
        write_f32(&mut bytes, offsets::Y, self.y);
        write_f32(&mut bytes, offsets::Z, self.z);
        write_f32(&mut bytes, offsets::AX, self.ax);
        write_f32(&mut bytes, offsets::AY, self.ay);
        write_f32(&mut bytes, offsets::AZ, self.az);
        bytes
    }

    /// 姿态四元数（传感器坐标系）
    pub fn orientation(&self) -> Quaternion {
        Quaternion::new(self.w, self.x, self.y, self.z)
    }

    /// 原始加速度（传感器坐标系）
    pub fn acceleration(&self) -> [f32; 3] {
        [self.ax, self.ay, self.az]
    }
}

impl TryFrom<&[u8]> for WireSample {
    type Error = ProtocolError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::decode(bytes)
    }
}

impl From<WireSample> for [u8; WIRE_SAMPLE_SIZE] {
    fn from(sample: WireSample) -> Self {
        sample.encode()
    }
}

#[inline]
fn read_f32(bytes: &[u8; WIRE_SAMPLE_SIZE], offset: usize) -> f32 {
    bytes_to_f32_le([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_f32(bytes: &mut [u8; WIRE_SAMPLE_SIZE], offset: usize, value: f32) {
    bytes[offset..offset + 4].copy_from_slice(&f32_to_bytes_le(value));
}
